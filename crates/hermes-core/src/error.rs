//! Error types for Hermes.
//!
//! This module provides [`HermesError`], the standard error type used
//! throughout the gateway, together with its category/status-code mapping
//! and the serializable envelope returned to HTTP callers.
//!
//! The taxonomy follows the propagation policy of the gateway: validation
//! failures are rejected before any store access, store failures propagate
//! as typed errors all the way to the HTTP response, and an empty result
//! set is a success, not an error.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::ValidationError;

/// Result type alias using [`HermesError`].
pub type HermesResult<T> = Result<T, HermesError>;

/// Categories of errors for classification and HTTP mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Request validation errors (invalid input, schema mismatch).
    Validation,
    /// Resource not found (unknown procedure).
    NotFound,
    /// Conflict (a pair with the same id already exists).
    Conflict,
    /// The document store failed to complete a save or scan.
    Store,
    /// A store call exceeded its bounded timeout.
    Timeout,
    /// Internal server errors.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Store => StatusCode::BAD_GATEWAY,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Standard error type for Hermes.
///
/// `HermesError` provides structured errors with categorization, HTTP status
/// mapping, and a serializable envelope for responses.
///
/// # Example
///
/// ```
/// use hermes_core::HermesError;
///
/// fn require_payload(data: &str) -> Result<(), HermesError> {
///     if data.is_empty() {
///         return Err(HermesError::validation("payload cannot be empty"));
///     }
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum HermesError {
    /// Request validation failed before the handler ran.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
        /// JSON path of the offending field, when known.
        path: Option<String>,
    },

    /// Resource not found.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// Conflict with existing state.
    #[error("Conflict: {message}")]
    Conflict {
        /// Human-readable error message.
        message: String,
    },

    /// The document store failed.
    #[error("Store error: {message}")]
    Store {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },

    /// A store call exceeded its bounded timeout.
    #[error("Timeout: {message}")]
    Timeout {
        /// Human-readable error message.
        message: String,
    },

    /// Internal server error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl HermesError {
    /// Creates a validation error with a message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            path: None,
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates a store error.
    #[must_use]
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a store error with a source error.
    pub fn store_with_source(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Store {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::Store { .. } => ErrorCategory::Store,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Conflict { .. } => "CONFLICT",
            Self::Store { .. } => "STORE_ERROR",
            Self::Timeout { .. } => "TIMEOUT",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Converts this error to a serializable error envelope.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        ErrorEnvelope {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
                category: self.category(),
                path: match self {
                    Self::Validation { path, .. } => path.clone(),
                    _ => None,
                },
            },
            request_id: request_id.map(ToString::to_string),
        }
    }
}

impl From<ValidationError> for HermesError {
    fn from(err: ValidationError) -> Self {
        Self::Validation {
            message: err.message,
            path: Some(err.path),
        }
    }
}

impl From<crate::pair::InvalidPair> for HermesError {
    fn from(err: crate::pair::InvalidPair) -> Self {
        Self::validation(err.to_string())
    }
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
    /// The request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Error category.
    pub category: ErrorCategory,
    /// JSON path of the offending field, for validation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let error = HermesError::validation("email must be a string");
        assert_eq!(error.category(), ErrorCategory::Validation);
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert!(error.to_string().contains("email must be a string"));
    }

    #[test]
    fn test_conflict_error() {
        let error = HermesError::conflict("pair '3' already exists");
        assert_eq!(error.category(), ErrorCategory::Conflict);
        assert_eq!(error.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_store_error_maps_to_bad_gateway() {
        let error = HermesError::store("scan failed");
        assert_eq!(error.category(), ErrorCategory::Store);
        assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_timeout_error_maps_to_gateway_timeout() {
        let error = HermesError::timeout("store scan exceeded 10s");
        assert_eq!(error.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_store_error_with_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let error = HermesError::store_with_source("save failed", io);
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_envelope_serialization() {
        let error = HermesError::not_found("no such procedure: helo");
        let envelope = error.to_envelope(Some("req-456"));

        let json = serde_json::to_string(&envelope).expect("serialization should work");
        assert!(json.contains("\"code\":\"NOT_FOUND\""));
        assert!(json.contains("\"request_id\":\"req-456\""));
        assert!(json.contains("\"category\":\"not_found\""));
    }

    #[test]
    fn test_validation_envelope_carries_path() {
        let error = HermesError::from(ValidationError {
            path: "$.email".to_string(),
            message: "expected string, got number".to_string(),
        });
        let envelope = error.to_envelope(None);
        assert_eq!(envelope.error.path.as_deref(), Some("$.email"));
    }

    #[test]
    fn test_all_error_categories_have_error_status_codes() {
        let categories = [
            ErrorCategory::Validation,
            ErrorCategory::NotFound,
            ErrorCategory::Conflict,
            ErrorCategory::Store,
            ErrorCategory::Timeout,
            ErrorCategory::Internal,
        ];

        for category in categories {
            let status = category.default_status_code();
            assert!(
                status.is_client_error() || status.is_server_error(),
                "Category {:?} should map to an error status code, got {}",
                category,
                status
            );
        }
    }
}
