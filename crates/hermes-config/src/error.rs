//! Configuration error types.

use thiserror::Error;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Io {
        /// The file path.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file could not be parsed.
    #[error("failed to parse config file '{path}': {message}")]
    Parse {
        /// The file path.
        path: String,
        /// The parser's error message.
        message: String,
    },

    /// A configuration file has an unsupported extension.
    #[error("unsupported config format for '{path}' (expected .toml or .json)")]
    UnsupportedFormat {
        /// The file path.
        path: String,
    },

    /// An environment variable override could not be parsed.
    #[error("invalid environment override '{key}': {message}")]
    EnvParse {
        /// The environment variable name.
        key: String,
        /// What was expected.
        message: String,
    },

    /// A configuration value failed validation.
    #[error("invalid value for '{key}': {message}")]
    InvalidValue {
        /// The configuration key.
        key: String,
        /// Why the value is invalid.
        message: String,
    },
}

impl ConfigError {
    /// Creates an invalid-value error.
    #[must_use]
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Creates an environment-parse error.
    #[must_use]
    pub fn env_parse(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EnvParse {
            key: key.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::invalid_value("server.http_addr", "invalid socket address");
        assert!(err.to_string().contains("server.http_addr"));

        let err = ConfigError::env_parse("HERMES_SERVER_REQUEST_TIMEOUT_SECS", "expected integer");
        assert!(err.to_string().contains("expected integer"));
    }
}
