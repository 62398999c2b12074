//! The Pair entity.
//!
//! A [`Pair`] is the sole persisted record in Hermes: a source-language
//! phrase and its translation, owned by an email address. Pairs are created
//! once and read back by scanning on the owner email; they are never updated
//! or deleted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A stored phrase/translation record.
///
/// All four fields are required, non-empty strings. The `id` is opaque and
/// unique across all stored pairs; it must be assigned before the pair
/// reaches the store. The `email` is an owner identifier and is not checked
/// against any mailbox format beyond being non-empty.
///
/// # Example
///
/// ```
/// use hermes_core::Pair;
///
/// let pair = Pair::new("1", "a@x.com", "hi", "bonjour").unwrap();
/// assert_eq!(pair.email, "a@x.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    /// Opaque unique identifier, assigned before persistence.
    pub id: String,
    /// Owner identifier. Scans filter on this field.
    pub email: String,
    /// Source-language text.
    pub phrase: String,
    /// Target-language text.
    pub translation: String,
}

impl Pair {
    /// Constructs a pair, checking that every field is non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPair::EmptyField`] naming the first empty field.
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        phrase: impl Into<String>,
        translation: impl Into<String>,
    ) -> Result<Self, InvalidPair> {
        let pair = Self {
            id: id.into(),
            email: email.into(),
            phrase: phrase.into(),
            translation: translation.into(),
        };
        pair.check_fields()?;
        Ok(pair)
    }

    /// Re-checks the non-empty field invariant.
    ///
    /// Useful after deserializing a pair from an untrusted source, since
    /// serde does not enforce the field constraints.
    pub fn check_fields(&self) -> Result<(), InvalidPair> {
        for (name, value) in [
            ("id", &self.id),
            ("email", &self.email),
            ("phrase", &self.phrase),
            ("translation", &self.translation),
        ] {
            if value.is_empty() {
                return Err(InvalidPair::EmptyField { field: name });
            }
        }
        Ok(())
    }
}

/// Construction error for [`Pair`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidPair {
    /// A required field was empty.
    #[error("pair field '{field}' must be a non-empty string")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },
}
