//! # Hermes Server
//!
//! The HTTP gateway for the Hermes phrasebook service, built on Hyper and
//! Tokio.
//!
//! The gateway owns everything between the socket and the procedure
//! dispatcher: CORS, the per-call context built from request headers, the
//! `/rpc/{procedure}` routing surface, liveness/readiness probes, metrics
//! exposition, and graceful shutdown.

#![doc(html_root_url = "https://docs.rs/hermes-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod context;
pub mod cors;
pub mod health;
mod server;
pub mod shutdown;

pub use config::{GatewayConfig, GatewayConfigBuilder};
pub use context::{context_from_headers, USERNAME_HEADER};
pub use cors::{AllowedOrigins, Cors, CorsConfig};
pub use health::{HealthCheck, HealthStatus, ReadinessCheck, ReadinessStatus};
pub use server::{HttpResponse, ResponseBody, Server, ServerBuilder, ServerError};
pub use shutdown::{ConnectionTracker, ShutdownSignal};
