//! Health and readiness probes.
//!
//! `/health` answers "is the process running", `/ready` answers "should
//! traffic be routed here". Readiness flips to false while the server
//! drains connections during shutdown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Health status response, returned by the `/health` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    /// Service status ("healthy" while the process runs).
    status: String,

    /// Service name.
    service: String,

    /// Service version.
    version: String,

    /// Server uptime in seconds.
    uptime_seconds: u64,
}

impl HealthStatus {
    /// Creates a new health status.
    #[must_use]
    pub fn new(
        status: impl Into<String>,
        service: impl Into<String>,
        version: impl Into<String>,
        uptime: Duration,
    ) -> Self {
        Self {
            status: status.into(),
            service: service.into(),
            version: version.into(),
            uptime_seconds: uptime.as_secs(),
        }
    }

    /// Returns the status string.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Returns the service name.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Returns the service version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns whether the status is healthy.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Liveness probe handler.
///
/// Always reports healthy while the process runs; a hung process simply
/// stops answering.
#[derive(Debug, Clone)]
pub struct HealthCheck {
    service: String,
    version: String,
    started_at: Instant,
}

impl HealthCheck {
    /// Creates a health check for the named service.
    #[must_use]
    pub fn new(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            version: version.into(),
            started_at: Instant::now(),
        }
    }

    /// Returns the service name.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Returns the service version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the current health status.
    #[must_use]
    pub fn status(&self) -> HealthStatus {
        HealthStatus::new(
            "healthy",
            self.service.clone(),
            self.version.clone(),
            self.started_at.elapsed(),
        )
    }
}

/// Readiness status response, returned by the `/ready` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReadinessStatus {
    /// Whether the server is ready to accept traffic.
    ready: bool,
}

impl ReadinessStatus {
    /// Returns whether the server is ready.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.ready
    }
}

/// Readiness probe handler.
///
/// Shared across tasks; the server flips it to not-ready while draining.
#[derive(Debug, Clone)]
pub struct ReadinessCheck {
    ready: Arc<AtomicBool>,
}

impl ReadinessCheck {
    /// Creates a readiness check that starts ready.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ready: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Sets the readiness flag.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Returns whether the server is ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Returns the current readiness status.
    #[must_use]
    pub fn status(&self) -> ReadinessStatus {
        ReadinessStatus {
            ready: self.is_ready(),
        }
    }
}

impl Default for ReadinessCheck {
    fn default() -> Self {
        Self::new()
    }
}
