//! Telemetry error types.

use thiserror::Error;

/// Errors from telemetry initialization.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Logging subsystem failed to initialize.
    #[error("logging initialization failed: {0}")]
    LoggingInit(String),

    /// Metrics recorder failed to initialize.
    #[error("metrics initialization failed: {0}")]
    MetricsInit(String),
}
