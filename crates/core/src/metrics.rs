//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Restoration calls (attempts by mode and result, duration)
//! - Batch runs (runs, per-item outcomes)
//! - Preview handle lifecycle

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Restoration Metrics
// =============================================================================

/// Restoration attempts total by mode and result.
pub static RESTORATION_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "rekindle_restoration_attempts_total",
            "Total restoration attempts",
        ),
        &["mode", "result"], // result: "success" or an error kind
    )
    .unwrap()
});

/// Restoration duration in seconds, including time spent waiting on the deadline.
pub static RESTORATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "rekindle_restoration_duration_seconds",
            "Duration of one restoration call",
        )
        .buckets(vec![1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 45.0, 60.0, 90.0, 120.0]),
        &["mode"],
    )
    .unwrap()
});

// =============================================================================
// Batch Metrics
// =============================================================================

/// Batch runs started.
pub static BATCH_RUNS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("rekindle_batch_runs_total", "Total batch runs started").unwrap()
});

/// Per-item outcomes within batch runs.
pub static BATCH_ITEMS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("rekindle_batch_items_total", "Items processed by batch runs"),
        &["outcome"], // "completed", "failed", "skipped"
    )
    .unwrap()
});

// =============================================================================
// Preview Metrics
// =============================================================================

/// Preview handles released.
pub static PREVIEWS_RELEASED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "rekindle_previews_released_total",
        "Total preview handles released",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Restoration
        Box::new(RESTORATION_ATTEMPTS.clone()),
        Box::new(RESTORATION_DURATION.clone()),
        // Batch
        Box::new(BATCH_RUNS.clone()),
        Box::new(BATCH_ITEMS.clone()),
        // Previews
        Box::new(PREVIEWS_RELEASED.clone()),
    ]
}
