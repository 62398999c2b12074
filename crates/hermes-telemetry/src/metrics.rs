//! Prometheus metrics.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `hermes_requests_total` | Counter | `procedure`, `status` | Total procedure calls |
//! | `hermes_request_duration_seconds` | Histogram | `procedure` | Procedure call latency |
//!
//! The recorder is installed once at bootstrap; the gateway renders the
//! exposition text from [`render_metrics`] on its `/metrics` route.

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;

/// Global metrics handle for rendering.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Request counter name.
pub const REQUESTS_TOTAL: &str = "hermes_requests_total";

/// Request latency histogram name.
pub const REQUEST_DURATION_SECONDS: &str = "hermes_request_duration_seconds";

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Histogram buckets for request duration, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_buckets: vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        }
    }
}

/// Installs the Prometheus recorder and registers metric descriptions.
///
/// # Errors
///
/// Returns [`TelemetryError::MetricsInit`] if the recorder cannot be built
/// or one is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_DURATION_SECONDS.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    describe_counter!(REQUESTS_TOTAL, "Total procedure calls by status");
    describe_histogram!(REQUEST_DURATION_SECONDS, "Procedure call latency in seconds");

    let _ = METRICS_HANDLE.set(handle);
    Ok(())
}

/// Renders the Prometheus exposition text.
///
/// Returns `None` until [`init_metrics`] has installed the recorder.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

/// Records a completed procedure call.
pub fn record_request(procedure: &str, status: u16, duration: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "procedure" => procedure.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
    histogram!(
        REQUEST_DURATION_SECONDS,
        "procedure" => procedure.to_string(),
    )
    .record(duration.as_secs_f64());
}
