// src/server/mod.rs

use crate::config::Config;
use anyhow::Result;

pub mod connection_loop;
pub mod context;
pub mod initialization;

pub use context::ServerContext;

/// The main server startup function: bind, load state, run the accept loop
/// until a signal or an explicit stop.
pub async fn run(config: Config) -> Result<()> {
    let server_context = initialization::setup(config).await?;
    connection_loop::run(server_context).await;
    Ok(())
}
