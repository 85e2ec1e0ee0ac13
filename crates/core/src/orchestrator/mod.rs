//! Batch restoration orchestrator.
//!
//! The orchestrator drives photos through their state machine:
//! - **Single photo**: start, call the remote client under a deadline, settle
//! - **Batch**: snapshot of eligible photos, sequential by default
//! - **Classification**: the only place failures become user-facing messages

mod classify;
mod config;
mod runner;
mod types;

pub use classify::{
    classify, Classified, CONNECTIVITY_MESSAGE, CREDENTIAL_INVALID_MESSAGE,
    GENERIC_FAILURE_MESSAGE, QUOTA_EXCEEDED_MESSAGE, TIMEOUT_MESSAGE,
};
pub use config::OrchestratorConfig;
pub use runner::{ProgressCallback, RestorationOrchestrator};
pub use types::{BatchProgress, BatchSummary, ItemOutcome, OrchestratorError, OrchestratorStatus};
