//! Orchestrator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::timeout::DEFAULT_TIMEOUT;

/// Configuration for the restoration orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Deadline for one restoration call (milliseconds).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Photos restored at the same time during a batch run.
    /// 1 keeps batches strictly sequential.
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,

    /// Abort the in-flight request when the deadline passes.
    /// When false the request is left to finish and its result is discarded.
    #[serde(default)]
    pub abort_on_timeout: bool,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}

fn default_max_parallel() -> usize {
    1
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_parallel: default_max_parallel(),
            abort_on_timeout: false,
        }
    }
}

impl OrchestratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
