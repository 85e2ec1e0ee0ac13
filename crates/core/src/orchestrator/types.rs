//! Types for the restoration orchestrator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::photo::{PhotoId, StatusCounts};

/// Errors that can occur when starting orchestration.
///
/// Per-photo failures are never returned; they are stored on the photo.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrchestratorError {
    /// A batch run is already in progress.
    #[error("a batch run is already in progress")]
    BatchInProgress,
}

/// What happened to one photo in `process_one`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemOutcome {
    Completed,
    Failed,
    /// Start was ignored (already processing or completed) or the photo is gone.
    Skipped,
}

impl ItemOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemOutcome::Completed => "completed",
            ItemOutcome::Failed => "failed",
            ItemOutcome::Skipped => "skipped",
        }
    }
}

/// Progress report emitted after each photo of a batch run settles.
#[derive(Debug, Clone, Serialize)]
pub struct BatchProgress {
    pub id: PhotoId,
    pub outcome: ItemOutcome,
    /// Photos settled so far in this run, including this one.
    pub done: usize,
    /// Photos in the run's snapshot.
    pub total: usize,
}

/// Totals for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Photos captured in the snapshot at the start of the run.
    pub eligible: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Completed => self.completed += 1,
            ItemOutcome::Failed => self.failed += 1,
            ItemOutcome::Skipped => self.skipped += 1,
        }
    }
}

/// Current status of the orchestrator.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrchestratorStatus {
    /// Whether a batch run is in progress.
    pub batch_running: bool,
    /// Whether a usable credential is believed to be available.
    pub has_credential: bool,
    /// Photos per status.
    pub counts: StatusCounts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_record() {
        let mut summary = BatchSummary {
            eligible: 3,
            ..Default::default()
        };
        summary.record(ItemOutcome::Completed);
        summary.record(ItemOutcome::Failed);
        summary.record(ItemOutcome::Skipped);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn test_orchestrator_status_default() {
        let status = OrchestratorStatus::default();
        assert!(!status.batch_running);
        assert!(!status.has_credential);
        assert_eq!(status.counts.total(), 0);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            OrchestratorError::BatchInProgress.to_string(),
            "a batch run is already in progress"
        );
    }
}
