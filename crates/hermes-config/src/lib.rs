//! # Hermes Config
//!
//! Typed configuration for the Hermes phrasebook gateway, loaded in layers:
//! built-in defaults, then a TOML or JSON file, then `HERMES_*` environment
//! variables. Later layers override earlier ones.
//!
//! # Example
//!
//! ```no_run
//! use hermes_config::ConfigLoader;
//!
//! # fn main() -> Result<(), hermes_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_file("hermes.toml")?
//!     .with_env_prefix("HERMES")
//!     .load()?;
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;

pub use config::{CorsSection, HermesConfig, ServerSection, StoreSection, TelemetrySection};
pub use error::ConfigError;
pub use loader::ConfigLoader;
