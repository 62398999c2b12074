//! Gateway configuration types.
//!
//! Builder-pattern configuration for the HTTP server itself. The layered
//! application config (files, environment) lives in `hermes-config` and
//! produces one of these for the gateway.

use std::net::SocketAddr;
use std::time::Duration;

/// Default HTTP bind address.
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8002";

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default graceful shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Gateway configuration.
///
/// # Example
///
/// ```rust
/// use hermes_server::GatewayConfig;
/// use std::time::Duration;
///
/// let config = GatewayConfig::builder()
///     .http_addr("127.0.0.1:8002")
///     .shutdown_timeout(Duration::from_secs(10))
///     .build();
///
/// assert_eq!(config.http_addr(), "127.0.0.1:8002");
/// ```
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// HTTP bind address (e.g. "0.0.0.0:8002").
    http_addr: String,

    /// Timeout applied to body collection and dispatch, per request.
    request_timeout: Duration,

    /// How long to wait for in-flight connections during shutdown.
    shutdown_timeout: Duration,
}

impl GatewayConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::default()
    }

    /// Returns the HTTP bind address.
    #[must_use]
    pub fn http_addr(&self) -> &str {
        &self.http_addr
    }

    /// Parses and returns the HTTP address as a `SocketAddr`.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.http_addr.parse()
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the graceful shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`GatewayConfig`].
#[derive(Debug, Clone)]
pub struct GatewayConfigBuilder {
    http_addr: String,
    request_timeout: Duration,
    shutdown_timeout: Duration,
}

impl GatewayConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
        }
    }

    /// Sets the HTTP bind address.
    #[must_use]
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.http_addr = addr.into();
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the graceful shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> GatewayConfig {
        GatewayConfig {
            http_addr: self.http_addr,
            request_timeout: self.request_timeout,
            shutdown_timeout: self.shutdown_timeout,
        }
    }
}

impl Default for GatewayConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.http_addr(), DEFAULT_HTTP_ADDR);
        assert_eq!(
            config.request_timeout(),
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_builder() {
        let config = GatewayConfig::builder()
            .http_addr("127.0.0.1:0")
            .request_timeout(Duration::from_secs(5))
            .shutdown_timeout(Duration::from_secs(1))
            .build();

        assert_eq!(config.http_addr(), "127.0.0.1:0");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(1));
        assert!(config.socket_addr().is_ok());
    }

    #[test]
    fn test_invalid_addr_fails_to_parse() {
        let config = GatewayConfig::builder().http_addr("not-an-addr").build();
        assert!(config.socket_addr().is_err());
    }
}
