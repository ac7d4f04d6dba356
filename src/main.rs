//! broadcast-relay server entry point.
//!
//! Starts the Axum HTTP server with the WebSocket relay and health
//! endpoints, and shuts down gracefully on Ctrl-C.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use broadcast_relay::app_state::AppState;
use broadcast_relay::config::RelayConfig;
use broadcast_relay::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = RelayConfig::from_env()?;
    tracing::info!(
        addr = %config.listen_addr,
        allow_list = %config.allow_list,
        dev_mode = config.dev_mode,
        max_connections = config.limits.max_connections,
        "starting broadcast-relay"
    );

    let state = AppState::new(&config);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    // Graceful shutdown
    let shutdown = state.shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for interrupt");
            return;
        }
        tracing::info!("interrupt received");
        shutdown.cancel();
    });

    server::serve(listener, state, config.shutdown_grace()).await?;

    tracing::info!("broadcast-relay stopped");
    Ok(())
}
