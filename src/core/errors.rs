// src/core/errors.rs

//! Defines the primary error type for the entire application.

use std::sync::Arc;
use thiserror::Error;

/// The main error enum, representing all possible failures within the server.
/// Messages on the domain variants are user-facing reply texts; the
/// dispatcher decides which variants may be shown to a client verbatim.
#[derive(Error, Debug, Clone)]
pub enum CadenzaError {
    #[error("IO Error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("User with email {0} already exists")]
    UserAlreadyExists(String),

    #[error(
        "Password is weak, should have at least 8 characters, including at least \
         one uppercase letter, one lowercase letter and one number"
    )]
    WeakPassword,

    #[error("Unable to login. User with email = {0} is not found. Please try again or register")]
    UserNotFound(String),

    #[error("Unable to login. Wrong password. Please try again")]
    WrongPassword,

    #[error("No authenticated identity is attached to this connection")]
    NotLoggedIn,

    #[error("Song {name} by: {singer} is not available")]
    SongNotFound { name: String, singer: String },

    #[error(
        "Playlist with name {0} does not exist. If you want you can create with \
         command create-playlist <name_of_the_playlist>"
    )]
    PlaylistNotFound(String),

    #[error(
        "Unable to create playlist because playlist with this name already exists. \
         Please try again and enter different playlist name"
    )]
    PlaylistAlreadyExists,

    #[error("Song {song} is already part of playlist {playlist}. Please add a different song")]
    SongAlreadyInPlaylist { song: String, playlist: String },

    #[error(
        "Unable to get top songs because the provided number is not positive. \
         Please try again and enter positive number"
    )]
    NotPositiveNumber,

    #[error("Another song is already streaming. Stop it before starting a new one")]
    StreamBusy,

    #[error("Unsupported audio source: {0}")]
    UnsupportedAudio(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Persistence Error: {0}")]
    Persistence(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

// --- From trait implementations for easy error conversion ---

impl From<std::io::Error> for CadenzaError {
    fn from(e: std::io::Error) -> Self {
        CadenzaError::Io(Arc::new(e))
    }
}

impl From<serde_json::Error> for CadenzaError {
    fn from(e: serde_json::Error) -> Self {
        CadenzaError::Internal(format!("JSON serialization error: {e}"))
    }
}

impl From<tokio::task::JoinError> for CadenzaError {
    fn from(e: tokio::task::JoinError) -> Self {
        CadenzaError::Internal(format!("Background task failed: {e}"))
    }
}
