//! # Ledger Gateway Node
//!
//! `gateway-node [config-path]`: serve JSON-RPC over HTTP and WebSocket in
//! front of the ledger backend. Without a path the defaults are used.

use std::path::PathBuf;

use anyhow::{Context, Result};
use gateway_node::{NodeConfig, NodeRuntime};
use gateway_telemetry::{init_telemetry, TelemetryConfig};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    init_telemetry(&telemetry).context("Failed to initialize telemetry")?;

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let mut config = NodeConfig::load(path.as_deref()).context("Failed to load configuration")?;
    if std::env::var_os("LG_METRICS_PORT").is_some() {
        config.gateway.admin.port = telemetry.metrics_port;
        config.validate().context("Invalid configuration")?;
    }

    info!("===========================================");
    info!("  Ledger Gateway v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");
    match &path {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("No configuration file given, using defaults"),
    }

    let runtime = NodeRuntime::new(config).await?;

    info!("Node is running. Press Ctrl+C to stop.");
    runtime
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await
}
