//! Input schemas for procedure payloads.
//!
//! Every procedure declares a [`Schema`] for its input. The dispatcher
//! validates the raw JSON payload against the schema before the handler
//! runs, so handlers only ever see well-shaped input.
//!
//! The schema language is deliberately small: the procedures in scope
//! exchange flat JSON objects of strings. A schema that is not `required`
//! accepts `null`, which is how "the whole input object is optional" is
//! expressed.
//!
//! # Example
//!
//! ```
//! use hermes_core::Schema;
//!
//! let schema = Schema::object(vec![
//!     ("id", Schema::string().required().min_length(1)),
//!     ("email", Schema::string().required().min_length(1)),
//! ]);
//!
//! let valid = serde_json::json!({ "id": "1", "email": "a@x.com" });
//! assert!(schema.validate(&valid).is_ok());
//!
//! let invalid = serde_json::json!({ "id": "1" });
//! assert!(schema.validate(&invalid).is_err());
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A JSON input schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schema {
    /// String type.
    String {
        /// Whether a null value is rejected.
        #[serde(default)]
        required: bool,
        /// Minimum length in bytes.
        min_length: Option<usize>,
    },
    /// Object type with named properties.
    Object {
        /// Whether a null value is rejected.
        #[serde(default)]
        required: bool,
        /// Properties and their schemas, in declaration order.
        properties: IndexMap<String, Schema>,
        /// Names of properties that must be present.
        #[serde(default)]
        required_properties: Vec<String>,
    },
    /// Any type (accepts anything, including null).
    Any,
}

impl Schema {
    /// Creates a string schema.
    #[must_use]
    pub fn string() -> Self {
        Self::String {
            required: false,
            min_length: None,
        }
    }

    /// Creates an object schema from a list of property definitions.
    ///
    /// Properties whose schemas are marked `required` become required
    /// properties of the object.
    #[must_use]
    pub fn object(properties: Vec<(&str, Schema)>) -> Self {
        let required_properties: Vec<String> = properties
            .iter()
            .filter(|(_, schema)| schema.is_required())
            .map(|(name, _)| (*name).to_string())
            .collect();

        let props: IndexMap<String, Schema> = properties
            .into_iter()
            .map(|(name, schema)| (name.to_string(), schema))
            .collect();

        Self::Object {
            required: false,
            properties: props,
            required_properties,
        }
    }

    /// Creates an "any" schema that accepts any value.
    #[must_use]
    pub fn any() -> Self {
        Self::Any
    }

    /// Marks this schema as required (rejecting null).
    #[must_use]
    pub fn required(self) -> Self {
        match self {
            Self::String { min_length, .. } => Self::String {
                required: true,
                min_length,
            },
            Self::Object {
                properties,
                required_properties,
                ..
            } => Self::Object {
                required: true,
                properties,
                required_properties,
            },
            Self::Any => Self::Any,
        }
    }

    /// Sets the minimum length for string schemas. No-op on other types.
    #[must_use]
    pub fn min_length(self, len: usize) -> Self {
        match self {
            Self::String { required, .. } => Self::String {
                required,
                min_length: Some(len),
            },
            other => other,
        }
    }

    /// Returns whether this schema rejects null.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        match self {
            Self::String { required, .. } | Self::Object { required, .. } => *required,
            Self::Any => false,
        }
    }

    /// Validates a JSON value against this schema.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] carrying the JSON path of the first
    /// violation found.
    pub fn validate(&self, value: &serde_json::Value) -> Result<(), ValidationError> {
        self.validate_at_path(value, "$")
    }

    fn validate_at_path(
        &self,
        value: &serde_json::Value,
        path: &str,
    ) -> Result<(), ValidationError> {
        if value.is_null() {
            if self.is_required() {
                return Err(ValidationError {
                    path: path.to_string(),
                    message: "required field is null".to_string(),
                });
            }
            return Ok(());
        }

        match self {
            Self::String { min_length, .. } => {
                let s = value.as_str().ok_or_else(|| ValidationError {
                    path: path.to_string(),
                    message: format!("expected string, got {}", value_type_name(value)),
                })?;

                if let Some(min) = min_length {
                    if s.len() < *min {
                        return Err(ValidationError {
                            path: path.to_string(),
                            message: format!(
                                "string length {} is less than minimum {}",
                                s.len(),
                                min
                            ),
                        });
                    }
                }

                Ok(())
            }

            Self::Object {
                properties,
                required_properties,
                ..
            } => {
                let obj = value.as_object().ok_or_else(|| ValidationError {
                    path: path.to_string(),
                    message: format!("expected object, got {}", value_type_name(value)),
                })?;

                for required in required_properties {
                    if !obj.contains_key(required) {
                        return Err(ValidationError {
                            path: format!("{}.{}", path, required),
                            message: format!("missing required property '{}'", required),
                        });
                    }
                }

                for (key, prop_schema) in properties {
                    if let Some(prop_value) = obj.get(key) {
                        let prop_path = format!("{}.{}", path, key);
                        prop_schema.validate_at_path(prop_value, &prop_path)?;
                    }
                }

                Ok(())
            }

            Self::Any => Ok(()),
        }
    }
}

/// Returns a human-readable name for a JSON value type.
fn value_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// A validation error from schema validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The JSON path where the error occurred.
    pub path: String,
    /// The error message.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation error at '{}': {}", self.path, self.message)
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_schema_validation() {
        let schema = Schema::string().min_length(1);

        assert!(schema.validate(&json!("hello")).is_ok());
        assert!(schema.validate(&json!("")).is_err());
        assert!(schema.validate(&json!(123)).is_err());
    }

    #[test]
    fn test_string_required() {
        let schema = Schema::string().required();

        assert!(schema.validate(&json!("hello")).is_ok());
        assert!(schema.validate(&json!(null)).is_err());
    }

    #[test]
    fn test_optional_string_accepts_null() {
        let schema = Schema::string();
        assert!(schema.validate(&json!(null)).is_ok());
    }

    #[test]
    fn test_object_schema_validation() {
        let schema = Schema::object(vec![
            ("email", Schema::string().required()),
            ("note", Schema::string()),
        ]);

        assert!(schema
            .validate(&json!({"email": "a@x.com", "note": "hi"}))
            .is_ok());
        assert!(schema.validate(&json!({"email": "a@x.com"})).is_ok());
        assert!(schema.validate(&json!({"note": "hi"})).is_err());
        assert!(schema.validate(&json!({"email": 3})).is_err());
        assert!(schema.validate(&json!("not an object")).is_err());
    }

    #[test]
    fn test_optional_object_accepts_null() {
        let schema = Schema::object(vec![("email", Schema::string())]);
        assert!(schema.validate(&json!(null)).is_ok());
    }

    #[test]
    fn test_unknown_properties_are_ignored() {
        let schema = Schema::object(vec![("email", Schema::string())]);
        assert!(schema.validate(&json!({"email": "a", "extra": 1})).is_ok());
    }

    #[test]
    fn test_validation_error_paths() {
        let schema = Schema::object(vec![("email", Schema::string().required())]);

        let err = schema.validate(&json!({"email": 42})).unwrap_err();
        assert_eq!(err.path, "$.email");
        assert!(err.message.contains("expected string"));

        let err = schema.validate(&json!({})).unwrap_err();
        assert_eq!(err.path, "$.email");
        assert!(err.message.contains("missing required property"));
    }

    #[test]
    fn test_any_schema() {
        let schema = Schema::any();

        assert!(schema.validate(&json!("string")).is_ok());
        assert!(schema.validate(&json!(123)).is_ok());
        assert!(schema.validate(&json!({"any": "thing"})).is_ok());
        assert!(schema.validate(&json!(null)).is_ok());
    }

    #[test]
    fn test_schema_serialization() {
        let schema = Schema::object(vec![("email", Schema::string().required())]);
        let json = serde_json::to_string(&schema).expect("serialization should work");
        assert!(json.contains("\"type\":\"object\""));
        assert!(json.contains("\"email\""));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn any_json_string_passes_plain_string_schema(s in ".*") {
                let schema = Schema::string();
                prop_assert!(schema.validate(&json!(s)).is_ok());
            }

            #[test]
            fn min_length_agrees_with_byte_length(s in ".*", min in 0usize..64) {
                let schema = Schema::string().min_length(min);
                let ok = schema.validate(&json!(s.clone())).is_ok();
                prop_assert_eq!(ok, s.len() >= min);
            }

            #[test]
            fn non_string_values_fail_string_schema(n in any::<i64>()) {
                let schema = Schema::string();
                prop_assert!(schema.validate(&json!(n)).is_err());
            }
        }
    }
}
