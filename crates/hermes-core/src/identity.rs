//! Caller identity.
//!
//! The gateway trusts a caller-supplied `username` header; there is no
//! authentication in front of it. A missing or empty header value maps to
//! [`CallerIdentity::Anonymous`].

use serde::{Deserialize, Serialize};

/// Sentinel name used for callers that did not identify themselves.
pub const ANONYMOUS: &str = "anonymous";

/// The identity of the caller, derived from request metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallerIdentity {
    /// A caller that supplied a non-empty username.
    Named {
        /// The caller-supplied name. Trusted as-is.
        name: String,
    },
    /// No usable identity was supplied.
    Anonymous,
}

impl CallerIdentity {
    /// Creates a named identity.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named { name: name.into() }
    }

    /// Derives an identity from an optional `username` header value.
    ///
    /// Missing or empty values yield [`CallerIdentity::Anonymous`].
    ///
    /// # Example
    ///
    /// ```
    /// use hermes_core::CallerIdentity;
    ///
    /// assert_eq!(CallerIdentity::from_username(Some("alice")).name(), Some("alice"));
    /// assert!(CallerIdentity::from_username(Some("")).is_anonymous());
    /// assert!(CallerIdentity::from_username(None).is_anonymous());
    /// ```
    #[must_use]
    pub fn from_username(value: Option<&str>) -> Self {
        match value {
            Some(name) if !name.is_empty() => Self::named(name),
            _ => Self::Anonymous,
        }
    }

    /// Returns the caller name, or `None` for anonymous callers.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named { name } => Some(name),
            Self::Anonymous => None,
        }
    }

    /// Returns the display name, using the [`ANONYMOUS`] sentinel when unset.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name().unwrap_or(ANONYMOUS)
    }

    /// Returns `true` for anonymous callers.
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// Returns a string identifier suitable for logging.
    ///
    /// Never returns sensitive information; the format is designed to be
    /// human-readable and useful for debugging.
    #[must_use]
    pub fn log_id(&self) -> String {
        match self {
            Self::Named { name } => format!("user:{name}"),
            Self::Anonymous => ANONYMOUS.to_string(),
        }
    }
}

impl Default for CallerIdentity {
    fn default() -> Self {
        Self::Anonymous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_log_id() {
        let identity = CallerIdentity::named("alice");
        assert_eq!(identity.log_id(), "user:alice");
    }

    #[test]
    fn test_anonymous_log_id() {
        assert_eq!(CallerIdentity::Anonymous.log_id(), "anonymous");
    }

    #[test]
    fn test_from_username_empty_is_anonymous() {
        assert!(CallerIdentity::from_username(Some("")).is_anonymous());
    }

    #[test]
    fn test_display_name_sentinel() {
        assert_eq!(CallerIdentity::Anonymous.display_name(), "anonymous");
        assert_eq!(CallerIdentity::named("bob").display_name(), "bob");
    }

    #[test]
    fn test_serialization() {
        let identity = CallerIdentity::named("alice");
        let json = serde_json::to_string(&identity).expect("serialization should work");
        assert!(json.contains("\"type\":\"named\""));

        let parsed: CallerIdentity =
            serde_json::from_str(&json).expect("deserialization should work");
        assert_eq!(identity, parsed);
    }
}
