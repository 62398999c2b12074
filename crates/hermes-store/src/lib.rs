//! # Hermes Store
//!
//! Store access for the Hermes phrasebook gateway.
//!
//! The external document store is modeled by the [`DocumentStore`] trait: a
//! black box that persists pairs and scans them with a per-item predicate,
//! completing each call through a single callback. [`PairStore`] adapts that
//! callback contract into awaitable, typed results for the procedure
//! handlers; [`MemoryStore`] is an in-process implementation used by the
//! standalone gateway binary and by tests.

#![doc(html_root_url = "https://docs.rs/hermes-store/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod adapter;
mod memory;
mod store;

pub use adapter::{PairStore, StoreError, DEFAULT_CALL_TIMEOUT};
pub use memory::MemoryStore;
pub use store::{DocumentStore, PutCallback, ScanCallback, ScanPredicate, StoreFailure};
