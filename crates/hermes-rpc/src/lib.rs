//! # Hermes RPC
//!
//! The procedure dispatcher for the Hermes phrasebook gateway.
//!
//! A [`ProcedureRegistry`] maps operation names to typed async handlers,
//! each declared as a query (read) or a mutation (write) together with an
//! input schema. The registry validates the raw payload before a handler
//! runs, so a handler is never invoked with malformed input.
//!
//! [`procedures`] wires the three gateway operations (`hello`,
//! `usersPairs`, `createPair`) into a registry over a
//! [`PairStore`](hermes_store::PairStore).

#![doc(html_root_url = "https://docs.rs/hermes-rpc/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod procedures;
mod registry;

pub use procedures::{build_registry, CreatePairInput, UsersPairsInput, UsersPairsReply, GREETING};
pub use registry::{ProcedureDef, ProcedureKind, ProcedureRegistry};
