//! Decides which selected files get written.
//!
//! Files that already carry GPS tags are only overwritten after the caller
//! confirms it. Files missing a capture date are offered as a separate action.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::metadata::MetadataEngine;
use crate::models::ImageRecord;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SelectionError {
    NoFilesSelected,
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFilesSelected => write!(f, "no files selected"),
        }
    }
}

impl std::error::Error for SelectionError {}

/// Final write sets for one selection event.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SelectionResult {
    pub to_write: Vec<PathBuf>,
    pub to_date: Vec<PathBuf>,
}

/// Per-file geotag state of one selection, in the order the files were picked.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Classification {
    pub records: Vec<ImageRecord>,
}

impl Classification {
    /// Reads every distinct path once. Unreadable files count as untagged.
    pub fn classify<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self::classify_with(paths, MetadataEngine::inspect)
    }

    pub fn classify_with<I, P, F>(paths: I, mut inspect: F) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
        F: FnMut(&Path) -> ImageRecord,
    {
        let mut seen = HashSet::new();
        let records = paths
            .into_iter()
            .filter(|path| seen.insert(path.as_ref().to_path_buf()))
            .map(|path| inspect(path.as_ref()))
            .collect();

        Self { records }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn all_paths(&self) -> Vec<PathBuf> {
        self.paths_where(|_| true)
    }

    pub fn with_gps(&self) -> Vec<PathBuf> {
        self.paths_where(|record| record.has_gps)
    }

    pub fn without_gps(&self) -> Vec<PathBuf> {
        self.paths_where(|record| !record.has_gps)
    }

    pub fn with_date(&self) -> Vec<PathBuf> {
        self.paths_where(|record| record.has_date)
    }

    pub fn without_date(&self) -> Vec<PathBuf> {
        self.paths_where(|record| !record.has_date)
    }

    /// Computes the write sets. `confirm_overwrite` is called only when some
    /// files are already geotagged, with exactly those files.
    pub fn resolve<F>(&self, confirm_overwrite: F) -> Result<SelectionResult, SelectionError>
    where
        F: FnOnce(&[PathBuf]) -> bool,
    {
        let tagged = self.with_gps();

        let to_write = if tagged.is_empty() {
            self.all_paths()
        } else if confirm_overwrite(&tagged) {
            info!(count = tagged.len(), "overwriting existing GPS tags");
            self.all_paths()
        } else {
            info!(count = tagged.len(), "keeping files that already have GPS tags");
            self.without_gps()
        };

        if to_write.is_empty() {
            return Err(SelectionError::NoFilesSelected);
        }

        Ok(SelectionResult {
            to_write,
            to_date: self.without_date(),
        })
    }

    fn paths_where<F>(&self, predicate: F) -> Vec<PathBuf>
    where
        F: Fn(&ImageRecord) -> bool,
    {
        self.records
            .iter()
            .filter(|record| predicate(record))
            .map(|record| record.path.clone())
            .collect()
    }
}
