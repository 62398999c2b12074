//! # Hermes Telemetry
//!
//! Observability for the Hermes phrasebook gateway: structured logging via
//! the tracing ecosystem and Prometheus metrics via the metrics facade.
//!
//! The gateway initializes both at bootstrap and serves the rendered
//! Prometheus exposition from its `/metrics` route.

#![doc(html_root_url = "https://docs.rs/hermes-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};
pub use metrics::{init_metrics, record_request, render_metrics, MetricsConfig};

/// Result type alias using [`TelemetryError`].
pub type TelemetryResult<T> = Result<T, TelemetryError>;
