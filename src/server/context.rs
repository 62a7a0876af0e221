// src/server/context.rs

use crate::core::state::ServerState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

/// Holds all the initialized state required to run the server's main loop.
pub struct ServerContext {
    pub state: Arc<ServerState>,
    pub listener: TcpListener,
    pub shutdown_tx: broadcast::Sender<()>,
}

impl ServerContext {
    /// The address the listener actually bound (relevant with port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// A handle that stops the server from any task or thread: sending on it
    /// wakes the accept loop and every connection handler without waiting for
    /// a new connection event.
    pub fn stop_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }
}
