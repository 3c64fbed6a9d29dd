//! Prometheus metrics for the strategy engine.
//!
//! The library records through the `metrics` facade only. Nothing is
//! exported until a recorder is installed, which the runner does with
//! [`init_metrics`] when `observability.metrics.enabled` is set.
//!
//! # Example
//!
//! ```ignore
//! use strategy_engine::observability::{init_metrics, MetricsConfig};
//!
//! let config = MetricsConfig { enabled: true, ..MetricsConfig::default() };
//! init_metrics(&config)?;
//!
//! record_search("exhaustive", "ok", 0.42);
//! ```

use std::net::SocketAddr;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde::{Deserialize, Serialize};

use crate::evaluator::RejectionCounts;

/// Configuration for the metrics exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Install the Prometheus exporter at startup.
    pub enabled: bool,
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
    /// Histogram buckets for search durations (in seconds).
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 9090)),
            // 1ms to 5 minutes
            duration_buckets: vec![
                0.001, 0.005, 0.025, 0.1, 0.5, 1.0, 2.5, 10.0, 30.0, 60.0, 300.0,
            ],
        }
    }
}

impl MetricsConfig {
    /// Enabled configuration bound to `addr`.
    #[must_use]
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            enabled: true,
            listen_addr: addr,
            ..Default::default()
        }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// Starts an HTTP server exposing `/metrics`.
///
/// # Errors
///
/// Returns an error if the buckets are rejected or the listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .set_buckets(&config.duration_buckets)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Search Metrics
// ============================================================================

/// Record one finished search invocation.
///
/// # Arguments
///
/// * `mode` - Enumeration mode label (`exhaustive`, `branch_and_bound`)
/// * `outcome` - `ok`, `cancelled` or an error reason
/// * `duration_seconds` - Wall time of the invocation
pub fn record_search(mode: &str, outcome: &str, duration_seconds: f64) {
    counter!(
        "strategy_search_total",
        "mode" => mode.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(
        "strategy_search_duration_seconds",
        "mode" => mode.to_string()
    )
    .record(duration_seconds);
}

/// Record evaluated work units.
pub fn record_units_evaluated(units: u64) {
    counter!("strategy_units_evaluated_total").increment(units);
}

/// Record rejected candidates by filter reason.
pub fn record_rejections(rejections: &RejectionCounts) {
    for (reason, count) in rejections.iter_nonzero() {
        counter!("strategy_candidates_rejected_total", "reason" => reason).increment(count);
    }
}

// ============================================================================
// Tests
// ============================================================================
