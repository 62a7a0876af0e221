// src/connection/mod.rs

//! Manages the lifecycle of a single client TCP connection: reading command
//! lines, dispatching them, and writing replies back.

mod guard;
mod handler;

pub use guard::ConnectionGuard;
pub use handler::ConnectionHandler;

use crate::core::session::ConnectionId;
use std::sync::Arc;
use tokio::io::AsyncWrite;
use tokio::sync::Mutex;

/// The write half of a connection, shared between the command loop (control
/// replies) and a stream task (format message, audio chunks, sentinel).
/// The mutex serializes individual writes; nothing orders the two planes
/// beyond the protocol's own command-history contract.
pub type SharedWriter = Arc<Mutex<Box<dyn AsyncWrite + Send + Unpin>>>;

/// What the dispatcher needs to know about the issuing connection: its
/// identity in the session registry and the shared write half for handing
/// off to a stream task.
#[derive(Clone)]
pub struct ClientHandle {
    pub id: ConnectionId,
    pub writer: SharedWriter,
}
