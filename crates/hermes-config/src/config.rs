//! Configuration types.
//!
//! [`HermesConfig`] is the root; each section has in-code defaults so a
//! missing file or section still yields a runnable gateway.

use hermes_telemetry::{LogConfig, MetricsConfig};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Complete gateway configuration.
///
/// # Example
///
/// ```
/// use hermes_config::HermesConfig;
///
/// let config = HermesConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:8002");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct HermesConfig {
    /// HTTP server configuration.
    pub server: ServerSection,

    /// Document store configuration.
    pub store: StoreSection,

    /// CORS configuration.
    pub cors: CorsSection,

    /// Telemetry configuration (logging, metrics).
    pub telemetry: TelemetrySection,
}

impl HermesConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .server
            .http_addr
            .parse::<std::net::SocketAddr>()
            .is_err()
        {
            return Err(ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }

        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "server.request_timeout_secs",
                "must be greater than zero",
            ));
        }

        if self.store.call_timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "store.call_timeout_secs",
                "must be greater than zero",
            ));
        }

        if self.cors.allowed_origins.iter().any(String::is_empty) {
            return Err(ConfigError::invalid_value(
                "cors.allowed_origins",
                "origins must be non-empty strings",
            ));
        }

        Ok(())
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    /// Bind address (e.g. "0.0.0.0:8002").
    pub http_addr: String,

    /// Per-request timeout, in seconds.
    pub request_timeout_secs: u64,

    /// Graceful shutdown drain timeout, in seconds.
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            http_addr: "0.0.0.0:8002".to_string(),
            request_timeout_secs: 30,
            shutdown_timeout_secs: 30,
        }
    }
}

/// Document store settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSection {
    /// Bound applied to every store call, in seconds.
    pub call_timeout_secs: u64,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            call_timeout_secs: 10,
        }
    }
}

/// CORS settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CorsSection {
    /// Origins allowed to call the gateway. `*` allows any origin.
    pub allowed_origins: Vec<String>,

    /// Whether credentialed requests are allowed.
    pub allow_credentials: bool,
}

impl Default for CorsSection {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            allow_credentials: true,
        }
    }
}

/// Telemetry settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct TelemetrySection {
    /// Logging configuration.
    pub logging: LogConfig,

    /// Metrics configuration.
    pub metrics: MetricsConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = HermesConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.store.call_timeout_secs, 10);
        assert_eq!(config.cors.allowed_origins, ["http://localhost:3000"]);
        assert!(config.telemetry.logging.enabled);
    }

    #[test]
    fn test_invalid_addr_is_rejected() {
        let config = HermesConfig {
            server: ServerSection {
                http_addr: "nope".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.http_addr"));
    }

    #[test]
    fn test_zero_timeouts_are_rejected() {
        let config = HermesConfig {
            store: StoreSection {
                call_timeout_secs: 0,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = HermesConfig {
            server: ServerSection {
                request_timeout_secs: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_origin_is_rejected() {
        let config = HermesConfig {
            cors: CorsSection {
                allowed_origins: vec![String::new()],
                allow_credentials: false,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_round_trips_through_toml() {
        let config = HermesConfig::default();
        let text = toml::to_string(&config).expect("serialization should work");
        let parsed: HermesConfig = toml::from_str(&text).expect("deserialization should work");
        assert_eq!(config, parsed);
    }
}
