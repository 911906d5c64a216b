//! Gateway server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p bazaar-gateway
//! ```
//!
//! Configuration is loaded from environment variables.

use bazaar_common::{try_init_tracing, AppConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, "Gateway failed to start");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting bazaar gateway...");

    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        env = ?config.app.env,
        port = config.gateway.server.port,
        heartbeat_interval_ms = config.gateway.heartbeat_interval_ms,
        "Configuration loaded"
    );

    bazaar_gateway::run(config).await?;

    Ok(())
}
