use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use tracing::{info, warn};

use crate::core::metadata::{self, MetadataEngine};
use crate::models::{BatchReport, GeoPoint, Operation, OperationResult, ProgressEvent};

/// Applies one write to every file of a batch, in order.
///
/// A failing file is recorded and the batch moves on. Files written before a
/// failure stay written.
pub struct BulkProcessor;

impl BulkProcessor {
    pub fn write_gps(
        paths: &[PathBuf],
        point: &GeoPoint,
        progress_tx: Option<&Sender<ProgressEvent>>,
    ) -> BatchReport {
        Self::process(Operation::WriteGps, paths, progress_tx, |path| {
            MetadataEngine::write_gps(path, point)
        })
    }

    /// The date is validated once up front; an invalid date writes nothing.
    pub fn write_date(
        paths: &[PathBuf],
        date: &str,
        progress_tx: Option<&Sender<ProgressEvent>>,
    ) -> metadata::Result<BatchReport> {
        let date = metadata::validate_exif_date(date)?;
        Ok(Self::process(Operation::WriteDate, paths, progress_tx, |path| {
            MetadataEngine::write_date(path, &date)
        }))
    }

    fn process<F>(
        operation: Operation,
        paths: &[PathBuf],
        progress_tx: Option<&Sender<ProgressEvent>>,
        mut write: F,
    ) -> BatchReport
    where
        F: FnMut(&Path) -> metadata::Result<()>,
    {
        let total = paths.len();
        let mut results = Vec::with_capacity(total);

        for (index, path) in paths.iter().enumerate() {
            let result = match write(path) {
                Ok(()) => OperationResult::success(path.clone()),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to write {}", operation.label());
                    OperationResult::failure(path.clone(), err.to_string())
                }
            };

            if let Some(tx) = progress_tx {
                let _ = tx.send(ProgressEvent {
                    current: index + 1,
                    total,
                    filename: filename(path),
                    success: result.success,
                });
            }

            results.push(result);
        }

        let report = BatchReport::new(operation, results);
        info!(
            operation = operation.label(),
            total = report.summary.total,
            succeeded = report.summary.succeeded,
            failed = report.summary.failed,
            "batch finished"
        );
        report
    }
}

fn filename(path: &Path) -> String {
    path.file_name()
        .map(|value| value.to_string_lossy().to_string())
        .unwrap_or_else(|| String::from("unknown"))
}
