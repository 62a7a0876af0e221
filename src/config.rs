// src/config.rs

//! Manages server configuration: loading from a TOML file and defaulting.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// The top-level server configuration.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    /// The interface the listening socket binds to.
    #[serde(default = "default_host")]
    pub host: String,
    /// The TCP port for the command/streaming protocol.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Initial log filter, overridable with `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Size of the per-connection read buffer. One read from this buffer is
    /// interpreted as one complete command line.
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub streaming: StreamingConfig,
}

/// Locations of the flat files that back the catalog and identity services.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_users_file")]
    pub users_file: PathBuf,
    #[serde(default = "default_songs_file")]
    pub songs_file: PathBuf,
    #[serde(default = "default_playlists_dir")]
    pub playlists_dir: PathBuf,
    #[serde(default = "default_errors_file")]
    pub errors_file: PathBuf,
}

/// Tuning for the audio data plane.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StreamingConfig {
    /// Directory holding one WAV file per song.
    #[serde(default = "default_music_dir")]
    pub music_dir: PathBuf,
    /// Size of one audio chunk written to the client.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Pause between consecutive chunk writes, pacing delivery.
    #[serde(with = "humantime_serde", default = "default_chunk_pause")]
    pub chunk_pause: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            read_buffer_size: default_read_buffer_size(),
            storage: StorageConfig::default(),
            streaming: StreamingConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            users_file: default_users_file(),
            songs_file: default_songs_file(),
            playlists_dir: default_playlists_dir(),
            errors_file: default_errors_file(),
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            music_dir: default_music_dir(),
            chunk_size: default_chunk_size(),
            chunk_pause: default_chunk_pause(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    7777
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_read_buffer_size() -> usize {
    1024
}
fn default_users_file() -> PathBuf {
    PathBuf::from("data/users.txt")
}
fn default_songs_file() -> PathBuf {
    PathBuf::from("data/songs.txt")
}
fn default_playlists_dir() -> PathBuf {
    PathBuf::from("data/playlists")
}
fn default_errors_file() -> PathBuf {
    PathBuf::from("data/errors.txt")
}
fn default_music_dir() -> PathBuf {
    PathBuf::from("data/music")
}
fn default_chunk_size() -> usize {
    10_000
}
fn default_chunk_pause() -> Duration {
    Duration::from_millis(20)
}

impl Config {
    /// Loads the configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{path}'"))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse TOML from '{path}'"))?;
        Ok(config)
    }
}
