//! # Hermes
//!
//! **A phrase/translation pair RPC gateway.**
//!
//! Hermes stores phrase/translation pairs keyed by an owner email and
//! serves them over a schema-validated procedure interface:
//!
//! - **Typed procedures** - every operation declares an input schema that is
//!   validated before its handler runs
//! - **Black-box store** - the document store is injected behind a callback
//!   contract and adapted into awaitable, typed results
//! - **Typed errors end to end** - store failures reach the caller as 5xx
//!   responses, never as success-shaped values
//! - **First-class observability** - structured logs and Prometheus metrics
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use hermes::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pairs = PairStore::new(Arc::new(MemoryStore::new()));
//!     let server = Server::builder()
//!         .http_addr("0.0.0.0:8002")
//!         .registry(build_registry(pairs))
//!         .build();
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → CORS → Context Factory → Dispatcher → Store Adapter → Engine
//!                                        ↓
//! Response ← Error Envelope ← Telemetry ←┘
//! ```

#![doc(html_root_url = "https://docs.rs/hermes/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use hermes_core as core;

// Re-export store types
pub use hermes_store as store;

// Re-export dispatcher types
pub use hermes_rpc as rpc;

// Re-export server types
pub use hermes_server as server;

// Re-export configuration types
pub use hermes_config as config;

// Re-export telemetry types
pub use hermes_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use hermes::prelude::*;
/// ```
pub mod prelude {
    pub use hermes_core::{
        CallerIdentity, ErrorCategory, HermesError, HermesResult, Pair, RequestContext, RequestId,
        Schema,
    };

    pub use hermes_store::{DocumentStore, MemoryStore, PairStore, ScanPredicate, StoreError};

    pub use hermes_rpc::{build_registry, ProcedureKind, ProcedureRegistry};

    pub use hermes_server::{
        context_from_headers, Cors, CorsConfig, GatewayConfig, Server, ShutdownSignal,
    };

    pub use hermes_config::{ConfigLoader, HermesConfig};

    pub use hermes_telemetry::{init_logging, init_metrics, LogConfig, MetricsConfig};
}
