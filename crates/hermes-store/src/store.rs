//! The document-store contract.
//!
//! Hermes treats the persistence engine as a black box: it can persist a
//! pair and it can scan all pairs with a per-item predicate on a named
//! field. Both operations complete through a single callback that the
//! engine invokes exactly once, with success or failure but never both.
//! The callback types are `FnOnce`, so a conforming implementation cannot
//! complete a call twice.

use hermes_core::Pair;
use thiserror::Error;

/// Completion callback for a put.
pub type PutCallback = Box<dyn FnOnce(Result<(), StoreFailure>) + Send>;

/// Completion callback for a scan.
pub type ScanCallback = Box<dyn FnOnce(Result<Vec<Pair>, StoreFailure>) + Send>;

/// A failure reported by the document store engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreFailure {
    /// A document with the same id already exists. Puts are conditional so
    /// that id uniqueness holds without a read-before-write.
    #[error("document with id '{id}' already exists")]
    Conflict {
        /// The conflicting document id.
        id: String,
    },

    /// The engine failed to complete the operation.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// A predicate evaluated against a field value for every scanned item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanPredicate {
    /// The field value contains the given substring.
    ///
    /// An empty substring matches every item.
    Contains(String),
}

impl ScanPredicate {
    /// Evaluates the predicate against a field value.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Contains(needle) => value.contains(needle.as_str()),
        }
    }
}

/// The external document store, as seen by the adapter.
///
/// Implementations own their concurrency control; the adapter holds no
/// state of its own. Calls may complete on any thread, synchronously or
/// not, but every call must invoke its callback exactly once.
pub trait DocumentStore: Send + Sync {
    /// Persists a pair.
    ///
    /// The put is conditional on the id not existing yet; a duplicate id
    /// completes with [`StoreFailure::Conflict`].
    fn put(&self, pair: Pair, on_done: PutCallback);

    /// Scans every stored pair, keeping those whose `field` value matches
    /// the predicate.
    ///
    /// The result preserves the engine's own ordering. Zero matches is a
    /// successful empty result, not a failure.
    fn scan(&self, field: &str, predicate: ScanPredicate, on_done: ScanCallback);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_predicate() {
        let predicate = ScanPredicate::Contains("a@x".to_string());
        assert!(predicate.matches("a@x.com"));
        assert!(!predicate.matches("b@y.com"));
    }

    #[test]
    fn test_empty_contains_matches_everything() {
        let predicate = ScanPredicate::Contains(String::new());
        assert!(predicate.matches("a@x.com"));
        assert!(predicate.matches(""));
    }

    #[test]
    fn test_failure_display() {
        let conflict = StoreFailure::Conflict { id: "3".to_string() };
        assert!(conflict.to_string().contains("'3'"));

        let backend = StoreFailure::Backend("connection reset".to_string());
        assert!(backend.to_string().contains("connection reset"));
    }
}
