use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Tiff,
    Png,
    WebP,
    Heif,
    Unknown,
}

impl ImageFormat {
    pub fn is_unknown(self) -> bool {
        self == Self::Unknown
    }

    /// Formats whose EXIF block is rewritten in place.
    pub fn supports_exif_write(self) -> bool {
        matches!(self, Self::Jpeg | Self::Tiff)
    }
}

/// Geotag state of one selected file, derived from its current metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub path: PathBuf,
    pub has_gps: bool,
    pub has_date: bool,
    pub location: Option<(f64, f64, f64)>,
    pub date_taken: Option<String>,
}

impl ImageRecord {
    /// Record for a file whose metadata could not be read.
    pub fn unreadable(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            has_gps: false,
            has_date: false,
            location: None,
            date_taken: None,
        }
    }
}
