//! Configuration loader with layered approach.
//!
//! Layers are applied in order, later layers overriding earlier ones:
//!
//! 1. Default values (built into the code)
//! 2. Configuration file (TOML or JSON)
//! 3. Environment variables with a prefix (e.g. `HERMES_SERVER_HTTP_ADDR`)

use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, HermesConfig};

/// Layered configuration loader.
///
/// # Example
///
/// ```no_run
/// use hermes_config::ConfigLoader;
///
/// # fn main() -> Result<(), hermes_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_file("hermes.toml")?
///     .with_env_prefix("HERMES")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: HermesConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Creates a loader starting from default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration file over the current values.
    ///
    /// The format is chosen by extension: `.toml` or `.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;

        self.config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&contents).map_err(|e| ConfigError::Parse {
                path: display,
                message: e.to_string(),
            })?,
            Some("json") => serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
                path: display,
                message: e.to_string(),
            })?,
            _ => return Err(ConfigError::UnsupportedFormat { path: display }),
        };

        Ok(self)
    }

    /// Loads a configuration file if it exists, keeping current values
    /// otherwise.
    pub fn with_file_if_exists(self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Sets the environment variable prefix for overrides.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Loads a `.env` file into the process environment, if one exists.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        let _ = dotenvy::dotenv();
        self
    }

    /// Applies environment overrides, validates, and returns the
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparsable override or an invalid final
    /// configuration.
    pub fn load(mut self) -> Result<HermesConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            for (key, value) in env::vars() {
                if let Some(suffix) = key.strip_prefix(&format!("{prefix}_")) {
                    self.apply_env_var(&key, suffix, &value)?;
                }
            }
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Applies a single environment override. Unrecognized keys under the
    /// prefix are ignored so unrelated variables (e.g. `HERMES_CONFIG`)
    /// can share it.
    fn apply_env_var(&mut self, key: &str, suffix: &str, value: &str) -> Result<(), ConfigError> {
        match suffix {
            "SERVER_HTTP_ADDR" => self.config.server.http_addr = value.to_string(),
            "SERVER_REQUEST_TIMEOUT_SECS" => {
                self.config.server.request_timeout_secs = parse_u64(key, value)?;
            }
            "SERVER_SHUTDOWN_TIMEOUT_SECS" => {
                self.config.server.shutdown_timeout_secs = parse_u64(key, value)?;
            }
            "STORE_CALL_TIMEOUT_SECS" => {
                self.config.store.call_timeout_secs = parse_u64(key, value)?;
            }
            "CORS_ALLOWED_ORIGINS" => {
                self.config.cors.allowed_origins = value
                    .split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect();
            }
            "CORS_ALLOW_CREDENTIALS" => {
                self.config.cors.allow_credentials = parse_bool(key, value)?;
            }
            "LOG_LEVEL" => self.config.telemetry.logging.level = value.to_string(),
            "LOG_JSON" => self.config.telemetry.logging.json_format = parse_bool(key, value)?,
            "METRICS_ENABLED" => {
                self.config.telemetry.metrics.enabled = parse_bool(key, value)?;
            }
            _ => {}
        }
        Ok(())
    }
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::env_parse(key, "expected integer"))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::env_parse(key, "expected boolean")),
    }
}
