//! # Hermes Core
//!
//! Core types for the Hermes phrasebook gateway.
//!
//! This crate provides the foundational types shared by the store adapter,
//! the procedure dispatcher, and the HTTP gateway:
//!
//! - [`Pair`] - The phrase/translation record keyed by an owner email
//! - [`RequestContext`] - Per-call context carrying identity and timing
//! - [`RequestId`] - UUID v7 request identifier
//! - [`CallerIdentity`] - Caller identity derived from request metadata
//! - [`HermesError`] - Standard error taxonomy with HTTP status mapping
//! - [`Schema`] - Input schema validation for procedure payloads

#![doc(html_root_url = "https://docs.rs/hermes-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod identity;
mod pair;
pub mod schema;

pub use context::{RequestContext, RequestId};
pub use error::{ErrorCategory, ErrorDetail, ErrorEnvelope, HermesError, HermesResult};
pub use identity::CallerIdentity;
pub use pair::{InvalidPair, Pair};
pub use schema::{Schema, ValidationError};
