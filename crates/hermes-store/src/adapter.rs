//! The pair store adapter.
//!
//! [`PairStore`] is the only writer and reader of persisted pairs. It turns
//! the engine's single-shot callbacks into awaitable results through a
//! oneshot channel: the callback resolves the channel exactly once, a
//! callback dropped without being invoked surfaces as
//! [`StoreError::Disconnected`] instead of hanging the caller, and every
//! call is bounded by a timeout so an unresponsive engine cannot pin a
//! request forever.

use crate::store::{DocumentStore, ScanPredicate, StoreFailure};
use hermes_core::{HermesError, Pair};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;

/// Default bound on a single store call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// An error surfaced by the adapter to procedure handlers.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A pair with the same id already exists.
    #[error("pair '{id}' already exists")]
    Conflict {
        /// The conflicting pair id.
        id: String,
    },

    /// The engine reported a failure.
    #[error("store backend error: {message}")]
    Backend {
        /// The engine's failure message.
        message: String,
    },

    /// The engine did not complete the call within the configured bound.
    #[error("store {operation} timed out after {timeout:?}")]
    Timeout {
        /// The store operation that timed out.
        operation: &'static str,
        /// The configured bound.
        timeout: Duration,
    },

    /// The engine dropped the completion callback without invoking it.
    #[error("store dropped the {operation} completion callback")]
    Disconnected {
        /// The store operation whose callback was dropped.
        operation: &'static str,
    },
}

impl StoreError {
    fn from_failure(failure: StoreFailure) -> Self {
        match failure {
            StoreFailure::Conflict { id } => Self::Conflict { id },
            StoreFailure::Backend(message) => Self::Backend { message },
        }
    }
}

impl From<StoreError> for HermesError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { .. } => Self::conflict(err.to_string()),
            StoreError::Timeout { .. } => Self::timeout(err.to_string()),
            StoreError::Backend { .. } | StoreError::Disconnected { .. } => {
                Self::store(err.to_string())
            }
        }
    }
}

/// Typed save/scan access over a [`DocumentStore`].
///
/// The engine handle is injected at construction; the adapter itself holds
/// no mutable state, so a single instance can be shared across calls.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use hermes_core::Pair;
/// use hermes_store::{MemoryStore, PairStore};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let pairs = PairStore::new(Arc::new(MemoryStore::new()));
/// pairs.save(Pair::new("1", "a@x.com", "hi", "bonjour").unwrap()).await.unwrap();
///
/// let found = pairs.scan_by_email_contains("a@x").await.unwrap();
/// assert_eq!(found.len(), 1);
/// # }
/// ```
#[derive(Clone)]
pub struct PairStore {
    store: Arc<dyn DocumentStore>,
    call_timeout: Duration,
}

impl PairStore {
    /// Creates an adapter over the given engine with the default call bound.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Sets the bound applied to every store call.
    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Returns the configured call bound.
    #[must_use]
    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Persists a new pair.
    ///
    /// Exactly one conditional write is issued. A duplicate id yields
    /// [`StoreError::Conflict`]; engine failures propagate as typed errors
    /// and are never masked as success.
    pub async fn save(&self, pair: Pair) -> Result<(), StoreError> {
        let id = pair.id.clone();
        let (tx, rx) = oneshot::channel();
        self.store.put(
            pair,
            Box::new(move |result| {
                // Receiver may be gone if the caller timed out; nothing to do.
                let _ = tx.send(result);
            }),
        );

        self.complete("put", rx).await.map(|()| {
            tracing::debug!(pair_id = %id, "pair saved");
        })
    }

    /// Scans all pairs whose `email` contains `substring`.
    ///
    /// An empty substring matches everything. The result keeps the engine's
    /// ordering; an empty result is a success.
    pub async fn scan_by_email_contains(&self, substring: &str) -> Result<Vec<Pair>, StoreError> {
        let (tx, rx) = oneshot::channel();
        self.store.scan(
            "email",
            ScanPredicate::Contains(substring.to_string()),
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        );

        let pairs = self.complete("scan", rx).await?;
        tracing::debug!(matches = pairs.len(), substring, "email scan completed");
        Ok(pairs)
    }

    /// Awaits a single-shot completion with the configured bound.
    ///
    /// The three failure paths are kept distinct: the engine reporting a
    /// failure, the engine dropping the callback, and the engine never
    /// completing within the bound.
    async fn complete<T>(
        &self,
        operation: &'static str,
        rx: oneshot::Receiver<Result<T, StoreFailure>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.call_timeout, rx).await {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(failure))) => {
                tracing::warn!(operation, error = %failure, "store call failed");
                Err(StoreError::from_failure(failure))
            }
            Ok(Err(_dropped)) => {
                tracing::warn!(operation, "store dropped completion callback");
                Err(StoreError::Disconnected { operation })
            }
            Err(_elapsed) => {
                tracing::warn!(operation, timeout = ?self.call_timeout, "store call timed out");
                Err(StoreError::Timeout {
                    operation,
                    timeout: self.call_timeout,
                })
            }
        }
    }
}

impl std::fmt::Debug for PairStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PairStore")
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::{PutCallback, ScanCallback};
    use parking_lot::Mutex;

    fn pair(id: &str, email: &str) -> Pair {
        Pair::new(id, email, "hi", "bonjour").unwrap()
    }

    /// Engine that reports a backend failure on every call.
    struct FailingStore;

    impl DocumentStore for FailingStore {
        fn put(&self, _pair: Pair, on_done: PutCallback) {
            on_done(Err(StoreFailure::Backend("disk on fire".to_string())));
        }

        fn scan(&self, _field: &str, _predicate: ScanPredicate, on_done: ScanCallback) {
            on_done(Err(StoreFailure::Backend("disk on fire".to_string())));
        }
    }

    /// Engine that drops every callback without invoking it.
    struct NoReplyStore;

    impl DocumentStore for NoReplyStore {
        fn put(&self, _pair: Pair, on_done: PutCallback) {
            drop(on_done);
        }

        fn scan(&self, _field: &str, _predicate: ScanPredicate, on_done: ScanCallback) {
            drop(on_done);
        }
    }

    /// Engine that holds callbacks forever without completing them.
    #[derive(Default)]
    struct HangingStore {
        parked_puts: Mutex<Vec<PutCallback>>,
        parked_scans: Mutex<Vec<ScanCallback>>,
    }

    impl DocumentStore for HangingStore {
        fn put(&self, _pair: Pair, on_done: PutCallback) {
            self.parked_puts.lock().push(on_done);
        }

        fn scan(&self, _field: &str, _predicate: ScanPredicate, on_done: ScanCallback) {
            self.parked_scans.lock().push(on_done);
        }
    }

    #[tokio::test]
    async fn test_save_then_scan() {
        let pairs = PairStore::new(Arc::new(MemoryStore::new()));
        pairs.save(pair("1", "a@x.com")).await.unwrap();
        pairs.save(pair("2", "b@y.com")).await.unwrap();

        let found = pairs.scan_by_email_contains("a@x").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "1");
    }

    #[tokio::test]
    async fn test_scan_empty_substring_returns_all_in_order() {
        let store = MemoryStore::seeded(vec![pair("1", "a@x.com"), pair("2", "b@y.com")]);
        let pairs = PairStore::new(Arc::new(store));

        let found = pairs.scan_by_email_contains("").await.unwrap();
        let ids: Vec<&str> = found.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
    }

    #[tokio::test]
    async fn test_scan_zero_matches_is_success_not_error() {
        let pairs = PairStore::new(Arc::new(MemoryStore::new()));
        let found = pairs.scan_by_email_contains("x").await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_id_is_conflict() {
        let pairs = PairStore::new(Arc::new(MemoryStore::new()));
        pairs.save(pair("1", "a@x.com")).await.unwrap();

        let err = pairs.save(pair("1", "b@y.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { id } if id == "1"));
    }

    #[tokio::test]
    async fn test_backend_failure_propagates_on_save() {
        let pairs = PairStore::new(Arc::new(FailingStore));
        let err = pairs.save(pair("1", "a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Backend { .. }));
    }

    #[tokio::test]
    async fn test_backend_failure_propagates_on_scan() {
        let pairs = PairStore::new(Arc::new(FailingStore));
        let err = pairs.scan_by_email_contains("a").await.unwrap_err();
        assert!(matches!(err, StoreError::Backend { .. }));
        assert!(err.to_string().contains("disk on fire"));
    }

    #[tokio::test]
    async fn test_dropped_callback_is_disconnected_not_a_hang() {
        let pairs = PairStore::new(Arc::new(NoReplyStore));
        let err = pairs.scan_by_email_contains("a").await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Disconnected { operation: "scan" }
        ));
    }

    #[tokio::test]
    async fn test_unresponsive_engine_times_out() {
        let pairs = PairStore::new(Arc::new(HangingStore::default()))
            .with_call_timeout(Duration::from_millis(20));

        let err = pairs.save(pair("1", "a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Timeout { operation: "put", .. }));
    }

    #[tokio::test]
    async fn test_timeout_is_configurable() {
        let pairs = PairStore::new(Arc::new(MemoryStore::new()))
            .with_call_timeout(Duration::from_millis(5));
        assert_eq!(pairs.call_timeout(), Duration::from_millis(5));
        // A synchronous engine still completes well inside the bound.
        pairs.save(pair("1", "a@x.com")).await.unwrap();
    }

    #[test]
    fn test_store_error_to_hermes_error_mapping() {
        let conflict: HermesError = StoreError::Conflict {
            id: "1".to_string(),
        }
        .into();
        assert_eq!(conflict.status_code().as_u16(), 409);

        let timeout: HermesError = StoreError::Timeout {
            operation: "scan",
            timeout: Duration::from_secs(10),
        }
        .into();
        assert_eq!(timeout.status_code().as_u16(), 504);

        let backend: HermesError = StoreError::Backend {
            message: "boom".to_string(),
        }
        .into();
        assert_eq!(backend.status_code().as_u16(), 502);

        let dropped: HermesError = StoreError::Disconnected { operation: "put" }.into();
        assert_eq!(dropped.status_code().as_u16(), 502);
    }
}
