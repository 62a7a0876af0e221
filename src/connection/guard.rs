// src/connection/guard.rs

//! Defines `ConnectionGuard`, an RAII guard for connection resource management.

use crate::core::session::ConnectionId;
use crate::core::state::ServerState;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

/// Ensures a connection's resources are released on every exit path of its
/// handler: the session registry entry goes away and a stream owned by the
/// connection is cooperatively stopped.
pub struct ConnectionGuard {
    state: Arc<ServerState>,
    connection_id: ConnectionId,
    addr: SocketAddr,
}

impl ConnectionGuard {
    pub(crate) fn new(state: Arc<ServerState>, connection_id: ConnectionId, addr: SocketAddr) -> Self {
        Self {
            state,
            connection_id,
            addr,
        }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        debug!(
            "Cleaning up resources for connection {} ({})",
            self.connection_id, self.addr
        );
        self.state.streaming.release_for(self.connection_id);
        self.state.sessions.forget(self.connection_id);
    }
}
