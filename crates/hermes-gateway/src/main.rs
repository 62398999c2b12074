//! Standalone Hermes gateway.
//!
//! Bootstraps the process: loads layered configuration, initializes
//! logging and metrics, wires the store adapter and procedure registry,
//! and runs the HTTP gateway until SIGTERM or SIGINT.

use std::sync::Arc;
use std::time::Duration;

use hermes_config::ConfigLoader;
use hermes_rpc::build_registry;
use hermes_server::{CorsConfig, Server};
use hermes_store::{MemoryStore, PairStore};
use hermes_telemetry::{init_logging, init_metrics};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path =
        std::env::var("HERMES_CONFIG").unwrap_or_else(|_| "hermes.toml".to_string());

    let config = ConfigLoader::new()
        .with_dotenv()
        .with_file_if_exists(&config_path)?
        .with_env_prefix("HERMES")
        .load()?;

    init_logging(&config.telemetry.logging)?;
    init_metrics(&config.telemetry.metrics)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.server.http_addr,
        "Starting Hermes gateway"
    );

    // The standalone binary runs against the in-process store. Hosted
    // deployments inject a managed engine through the same constructor.
    let pairs = PairStore::new(Arc::new(MemoryStore::new()))
        .with_call_timeout(Duration::from_secs(config.store.call_timeout_secs));

    let mut cors = CorsConfig::builder().allow_credentials(config.cors.allow_credentials);
    for origin in &config.cors.allowed_origins {
        cors = if origin == "*" {
            cors.allow_any_origin()
        } else {
            cors.allow_origin(origin.clone())
        };
    }

    let server = Server::builder()
        .http_addr(config.server.http_addr.clone())
        .request_timeout(Duration::from_secs(config.server.request_timeout_secs))
        .shutdown_timeout(Duration::from_secs(config.server.shutdown_timeout_secs))
        .registry(build_registry(pairs))
        .cors(cors.build())
        .service_name("hermes-gateway")
        .build();

    server.run().await?;
    Ok(())
}
