// src/core/session.rs

//! Associates live connections with their authentication state and the
//! current protocol mode of the shared socket.

use crate::core::CadenzaError;
use dashmap::DashMap;

/// Identifies one accepted connection for the lifetime of its socket.
pub type ConnectionId = u64;

/// Which plane currently owns writes on the connection: plain command/reply
/// text, or an audio stream interleaving with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtocolMode {
    #[default]
    Idle,
    Streaming,
}

/// Per-connection session state. An entry exists from the first observed
/// activity of a connection until it disconnects; `identity` is set by a
/// successful login and never overwritten afterwards.
#[derive(Debug, Default)]
pub struct Session {
    pub identity: Option<String>,
    pub mode: ProtocolMode,
}

/// The registry of all live sessions, keyed by connection id.
///
/// The map key guarantees the invariant that a connection id appears at most
/// once. Lookups and mutations happen from both connection handler tasks and
/// stream tasks, hence the concurrent map.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<ConnectionId, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensures an entry exists for the connection. Called on first observed
    /// activity; a no-op for an already-known connection.
    pub fn touch(&self, connection: ConnectionId) {
        self.sessions.entry(connection).or_default();
    }

    /// Attaches an authenticated identity to the connection. Idempotent: a
    /// second login on an already-authenticated connection neither overwrites
    /// nor duplicates the identity.
    pub fn mark_logged_in(&self, connection: ConnectionId, identity: &str) {
        let mut session = self.sessions.entry(connection).or_default();
        if session.identity.is_none() {
            session.identity = Some(identity.to_string());
        }
    }

    /// Removes the session entry. Safe to call when absent.
    pub fn forget(&self, connection: ConnectionId) {
        self.sessions.remove(&connection);
    }

    pub fn is_logged_in(&self, connection: ConnectionId) -> bool {
        self.sessions
            .get(&connection)
            .is_some_and(|s| s.identity.is_some())
    }

    /// Returns the authenticated identity of the connection.
    ///
    /// Precondition-style API: callers are expected to branch on
    /// [`Self::is_logged_in`] first; an absent identity is an error, not a
    /// silent default.
    pub fn identity_of(&self, connection: ConnectionId) -> Result<String, CadenzaError> {
        self.sessions
            .get(&connection)
            .and_then(|s| s.identity.clone())
            .ok_or(CadenzaError::NotLoggedIn)
    }

    /// Swaps the protocol mode of the connection, returning the previous one.
    /// A no-op returning `Idle` for an unknown connection (it may already
    /// have disconnected while a stream task was winding down).
    pub fn set_mode(&self, connection: ConnectionId, mode: ProtocolMode) -> ProtocolMode {
        match self.sessions.get_mut(&connection) {
            Some(mut session) => std::mem::replace(&mut session.mode, mode),
            None => ProtocolMode::Idle,
        }
    }

    pub fn mode_of(&self, connection: ConnectionId) -> ProtocolMode {
        self.sessions
            .get(&connection)
            .map(|s| s.mode)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
