//! Prometheus text export of the core metrics.

use anyhow::{Context, Result};
use prometheus::{Encoder, Registry, TextEncoder};

/// A registry holding every core collector.
pub fn registry() -> Result<Registry> {
    let registry = Registry::new();
    for metric in rekindle_core::metrics::all_metrics() {
        registry
            .register(metric)
            .context("Failed to register metric")?;
    }
    Ok(registry)
}

/// Encode all metrics in `registry` as Prometheus text format.
pub fn encode(registry: &Registry) -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics output is not UTF-8")
}

/// Current values of the core metrics.
pub fn render() -> Result<String> {
    encode(&registry()?)
}
