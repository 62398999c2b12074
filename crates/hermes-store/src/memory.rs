//! In-memory document store.
//!
//! [`MemoryStore`] backs the standalone gateway binary and the test suites.
//! It keeps pairs in insertion order, so scan results are deterministic,
//! and it completes callbacks synchronously on the calling thread, which is
//! a legal scheduling under the [`DocumentStore`] contract.

use crate::store::{DocumentStore, PutCallback, ScanCallback, ScanPredicate, StoreFailure};
use hermes_core::Pair;
use indexmap::IndexMap;
use parking_lot::RwLock;

/// An insertion-ordered, in-process [`DocumentStore`].
///
/// # Example
///
/// ```
/// use hermes_core::Pair;
/// use hermes_store::MemoryStore;
///
/// let store = MemoryStore::seeded(vec![
///     Pair::new("1", "a@x.com", "hi", "bonjour").unwrap(),
/// ]);
/// assert_eq!(store.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    pairs: RwLock<IndexMap<String, Pair>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given pairs.
    ///
    /// Later pairs overwrite earlier ones with the same id; seeding is for
    /// test and bootstrap use and does not go through the conditional put.
    #[must_use]
    pub fn seeded(pairs: impl IntoIterator<Item = Pair>) -> Self {
        let map: IndexMap<String, Pair> = pairs
            .into_iter()
            .map(|pair| (pair.id.clone(), pair))
            .collect();
        Self {
            pairs: RwLock::new(map),
        }
    }

    /// Returns the number of stored pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.read().len()
    }

    /// Returns `true` if no pairs are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.read().is_empty()
    }
}

/// Projects a named field out of a pair for predicate evaluation.
fn field_value<'a>(pair: &'a Pair, field: &str) -> Option<&'a str> {
    match field {
        "id" => Some(&pair.id),
        "email" => Some(&pair.email),
        "phrase" => Some(&pair.phrase),
        "translation" => Some(&pair.translation),
        _ => None,
    }
}

impl DocumentStore for MemoryStore {
    fn put(&self, pair: Pair, on_done: PutCallback) {
        let result = {
            let mut pairs = self.pairs.write();
            if pairs.contains_key(&pair.id) {
                Err(StoreFailure::Conflict {
                    id: pair.id.clone(),
                })
            } else {
                pairs.insert(pair.id.clone(), pair);
                Ok(())
            }
        };
        on_done(result);
    }

    fn scan(&self, field: &str, predicate: ScanPredicate, on_done: ScanCallback) {
        let result = {
            let pairs = self.pairs.read();
            if pairs.values().next().is_some_and(|p| field_value(p, field).is_none()) {
                Err(StoreFailure::Backend(format!(
                    "unknown scan field '{field}'"
                )))
            } else {
                Ok(pairs
                    .values()
                    .filter(|pair| {
                        field_value(pair, field).is_some_and(|value| predicate.matches(value))
                    })
                    .cloned()
                    .collect())
            }
        };
        on_done(result);
    }
}
