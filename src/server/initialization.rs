// src/server/initialization.rs

//! Handles the complete server initialization process, from state setup to
//! binding the listening socket. Failures here are fatal: a server that
//! cannot bind or cannot load its catalog does not start.

use super::context::ServerContext;
use crate::config::Config;
use crate::core::state::ServerState;
use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::info;

/// Initializes all server components before starting the main loop.
pub async fn setup(config: Config) -> Result<ServerContext> {
    let (shutdown_tx, _) = broadcast::channel(1);

    let state = ServerState::initialize(config.clone())
        .await
        .context("Failed to initialize server state")?;
    info!("Server state initialized.");

    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| {
            format!(
                "Failed to bind listening socket on {}:{}",
                config.host, config.port
            )
        })?;
    info!("Cadenza server listening on {}", listener.local_addr()?);

    Ok(ServerContext {
        state,
        listener,
        shutdown_tx,
    })
}
