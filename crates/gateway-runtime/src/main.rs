//! # SmartGuard Gateway
//!
//! Entry point: telemetry, configuration, bootstrap, then wait for Ctrl+C.

use anyhow::{Context, Result};
use gateway_runtime::container::GatewayConfig;
use gateway_runtime::GatewayRuntime;
use sg_telemetry::{init_telemetry, TelemetryConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry =
        init_telemetry(TelemetryConfig::from_env()).context("Failed to initialize telemetry")?;

    let config = GatewayConfig::from_env();
    info!(
        broker = %format!("{}:{}", config.mqtt.host, config.mqtt.port),
        store_mode = ?config.store.mode,
        "Starting SmartGuard gateway v{}",
        env!("CARGO_PKG_VERSION")
    );

    let runtime = GatewayRuntime::bootstrap(config).await?;
    runtime.start().await?;

    info!("Gateway is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    runtime.shutdown().await;
    Ok(())
}
