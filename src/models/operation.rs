use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    WriteGps,
    WriteDate,
}

impl Operation {
    pub fn label(self) -> &'static str {
        match self {
            Self::WriteGps => "GPS",
            Self::WriteDate => "date",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    pub path: PathBuf,
    pub success: bool,
    pub error: Option<String>,
}

impl OperationResult {
    pub fn success(path: PathBuf) -> Self {
        Self {
            path,
            success: true,
            error: None,
        }
    }

    pub fn failure(path: PathBuf, error: impl Into<String>) -> Self {
        Self {
            path,
            success: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProgressEvent {
    pub current: usize,
    pub total: usize,
    pub filename: String,
    pub success: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct OperationSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl OperationSummary {
    pub fn from_results(results: &[OperationResult]) -> Self {
        let succeeded = results.iter().filter(|result| result.success).count();

        Self {
            total: results.len(),
            succeeded,
            failed: results.len().saturating_sub(succeeded),
        }
    }
}

/// Outcome of one write batch: every file's result plus the counts.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub operation: Operation,
    pub results: Vec<OperationResult>,
    pub summary: OperationSummary,
}

impl BatchReport {
    pub fn new(operation: Operation, results: Vec<OperationResult>) -> Self {
        let summary = OperationSummary::from_results(&results);
        Self {
            operation,
            results,
            summary,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &OperationResult> {
        self.results.iter().filter(|result| !result.success)
    }

    pub fn all_succeeded(&self) -> bool {
        self.summary.failed == 0
    }
}
