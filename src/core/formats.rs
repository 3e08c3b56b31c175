use std::path::Path;

use crate::models::ImageFormat;

pub fn detect_format(path: &Path) -> ImageFormat {
    let Some(ext) = path.extension().and_then(|value| value.to_str()) else {
        return ImageFormat::Unknown;
    };

    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => ImageFormat::Jpeg,
        "tif" | "tiff" => ImageFormat::Tiff,
        "png" => ImageFormat::Png,
        "webp" => ImageFormat::WebP,
        "heic" | "heif" => ImageFormat::Heif,
        _ => ImageFormat::Unknown,
    }
}

pub fn is_supported(path: &Path) -> bool {
    !detect_format(path).is_unknown()
}

pub fn is_writable(path: &Path) -> bool {
    detect_format(path).supports_exif_write()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_by_extension_case_insensitively() {
        assert_eq!(detect_format(Path::new("IMG_0001.JPG")), ImageFormat::Jpeg);
        assert_eq!(detect_format(Path::new("scan.tiff")), ImageFormat::Tiff);
        assert_eq!(detect_format(Path::new("notes.txt")), ImageFormat::Unknown);
        assert_eq!(detect_format(Path::new("no_extension")), ImageFormat::Unknown);
    }

    #[test]
    fn only_jpeg_and_tiff_are_writable() {
        assert!(is_writable(Path::new("a.jpeg")));
        assert!(is_writable(Path::new("a.tif")));
        assert!(!is_writable(Path::new("a.png")));
        assert!(is_supported(Path::new("a.png")));
    }
}
