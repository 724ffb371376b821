// Inference Router - local gateway for an OpenAI-compatible backend
//
// Sits between a chat front end (Open WebUI or anything speaking its header
// dialect) and a local inference server such as LM Studio, forwarding model
// listing, embedding and chat-completion calls unchanged.
//
// Architecture:
// - Proxy server (axum): routes, buffered and streaming forwarders
// - Identity: normalizes caller identity headers for logs and /v1/whoami
// - Storage: r2d2 SQLite pool behind the /health/db check
// - Config: env > ~/.config/inference-router/config.toml > defaults

mod cli;
mod config;
mod identity;
mod logging;
mod proxy;
mod storage;

use anyhow::{Context, Result};
use config::Config;
use storage::Database;

#[tokio::main]
async fn main() -> Result<()> {
    // Handle CLI commands first (config --show, --reset, --path)
    // If a command was handled, exit early
    if cli::handle_cli()? {
        return Ok(());
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let config = Config::from_env()?;

    // The guard must be kept alive for the duration of the program to ensure logs flush
    let _file_guard = logging::init(&config.logging);

    tracing::info!(
        version = config::VERSION,
        bind = %config.bind_addr,
        backend = %config.backend.url,
        backend_name = %config.backend.name,
        timeout_secs = config.backend.timeout_secs,
        "Starting inference router"
    );

    let database = Database::open(&config.database)?;
    tracing::info!(
        path = database.label(),
        pool_size = config.database.pool_size,
        "Database pool ready"
    );

    let state = proxy::ProxyState::new(config.backend.clone(), database.clone())?;

    // Create shutdown channel for graceful proxy shutdown
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let mut proxy_handle =
        tokio::spawn(proxy::start_proxy(config.bind_addr, state, shutdown_rx));

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl+C")?;
        }
        // Server stopped on its own (bind failure, accept error)
        result = &mut proxy_handle => {
            drop(database);
            return result.context("Proxy task panicked")?;
        }
    }

    tracing::info!("Shutting down...");

    // Signal the proxy to shut down gracefully
    // If the send fails, the proxy has already shut down (which is fine)
    let _ = shutdown_tx.send(());

    match proxy_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("Proxy server error: {:#}", e),
        Err(e) => tracing::error!("Proxy task panicked: {}", e),
    }

    let label = database.label().to_string();
    drop(database);
    tracing::info!(path = %label, "Database pool closed");

    tracing::info!("Shutdown complete");
    Ok(())
}
