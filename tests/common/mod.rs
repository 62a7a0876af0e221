// tests/common/mod.rs

//! Shared test doubles and state builders for the unit test files.
//!
//! The store traits are implemented in memory so dispatcher and service tests
//! run without touching the filesystem; the audio library stub serves a
//! configurable byte payload with a canned format.

#![allow(dead_code)] // Each test binary uses its own subset of the helpers.

use async_trait::async_trait;
use cadenza::config::Config;
use cadenza::connection::{ClientHandle, SharedWriter};
use cadenza::core::CadenzaError;
use cadenza::core::catalog::{CatalogStore, Playlist, Song};
use cadenza::core::identity::{UserRecord, UserStore};
use cadenza::core::state::ServerState;
use cadenza::core::streaming::{AudioEncoding, AudioFormat, AudioLibrary, AudioSource};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::io::DuplexStream;
use tokio::sync::Mutex;

/// In-memory [`CatalogStore`], counting song-table saves so tests can assert
/// persistence side effects.
#[derive(Default)]
pub struct MemoryCatalogStore {
    pub songs: parking_lot::Mutex<Vec<Song>>,
    pub playlists: parking_lot::Mutex<Vec<Playlist>>,
    pub song_saves: AtomicUsize,
    /// When set, `save_songs` fails, simulating a broken persistence layer.
    pub fail_saves: std::sync::atomic::AtomicBool,
}

impl MemoryCatalogStore {
    pub fn with_songs(songs: Vec<Song>) -> Self {
        Self {
            songs: parking_lot::Mutex::new(songs),
            ..Self::default()
        }
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn load_songs(&self) -> Result<Vec<Song>, CadenzaError> {
        Ok(self.songs.lock().clone())
    }

    async fn save_songs(&self, songs: &[Song]) -> Result<(), CadenzaError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(CadenzaError::Persistence("song table unwritable".to_string()));
        }
        *self.songs.lock() = songs.to_vec();
        self.song_saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load_playlists(&self) -> Result<Vec<Playlist>, CadenzaError> {
        Ok(self.playlists.lock().clone())
    }

    async fn create_playlist(&self, name: &str) -> Result<(), CadenzaError> {
        self.playlists.lock().push(Playlist::new(name));
        Ok(())
    }

    async fn append_song(&self, playlist: &str, song: &Song) -> Result<(), CadenzaError> {
        let mut playlists = self.playlists.lock();
        if let Some(p) = playlists.iter_mut().find(|p| p.name == playlist) {
            p.songs.push(song.clone());
        }
        Ok(())
    }
}

/// In-memory [`UserStore`], counting appends so tests can assert that a
/// duplicate registration never writes.
#[derive(Default)]
pub struct MemoryUserStore {
    pub records: parking_lot::Mutex<Vec<UserRecord>>,
    pub appends: AtomicUsize,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn load(&self) -> Result<Vec<UserRecord>, CadenzaError> {
        Ok(self.records.lock().clone())
    }

    async fn append(&self, record: &UserRecord) -> Result<(), CadenzaError> {
        self.records.lock().push(record.clone());
        self.appends.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Serves the same byte payload for every song.
pub struct StubAudioLibrary {
    pub payload: Vec<u8>,
}

impl StubAudioLibrary {
    pub fn new(payload: Vec<u8>) -> Self {
        Self { payload }
    }
}

pub fn stub_format() -> AudioFormat {
    AudioFormat {
        encoding: AudioEncoding {
            name: "PCM_SIGNED".to_string(),
        },
        sample_rate: 44_100.0,
        sample_size_in_bits: 16,
        channels: 2,
        frame_size: 4,
        frame_rate: 44_100.0,
        big_endian: false,
    }
}

#[async_trait]
impl AudioLibrary for StubAudioLibrary {
    async fn open(&self, _song: &Song) -> Result<AudioSource, CadenzaError> {
        Ok(AudioSource {
            format: stub_format(),
            reader: Box::new(std::io::Cursor::new(self.payload.clone())),
        })
    }
}

/// A config tuned for fast tests: small chunks, no pacing delay to speak of.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.streaming.chunk_size = 8;
    config.streaming.chunk_pause = Duration::from_millis(1);
    config.storage.errors_file = std::env::temp_dir().join("cadenza-test-errors.txt");
    config
}

pub fn sample_songs() -> Vec<Song> {
    vec![
        Song::new("Shape of You", "Ed Sheeran", 12),
        Song::new("Believer", "Imagine Dragons", 30),
        Song::new("Thunder", "Imagine Dragons", 5),
    ]
}

/// Assembles a `ServerState` over in-memory stores and a stub audio payload.
pub async fn make_state(songs: Vec<Song>, payload: Vec<u8>) -> Arc<ServerState> {
    let (state, _) = make_state_with_store(songs, payload).await;
    state
}

/// Like [`make_state`], also handing back the catalog store for tests that
/// assert on or sabotage persistence.
pub async fn make_state_with_store(
    songs: Vec<Song>,
    payload: Vec<u8>,
) -> (Arc<ServerState>, Arc<MemoryCatalogStore>) {
    let catalog_store = Arc::new(MemoryCatalogStore::with_songs(songs));
    let state = ServerState::assemble(
        test_config(),
        Arc::new(MemoryUserStore::default()),
        catalog_store.clone(),
        Arc::new(StubAudioLibrary::new(payload)),
    )
    .await
    .expect("state assembly should succeed");
    (state, catalog_store)
}

/// Builds a client handle whose writer feeds the returned duplex end, so
/// tests can read whatever the server side writes.
pub fn make_client(connection_id: u64, state: &Arc<ServerState>) -> (ClientHandle, DuplexStream) {
    let (server_side, client_side) = tokio::io::duplex(64 * 1024);
    let writer: SharedWriter = Arc::new(Mutex::new(Box::new(server_side)));
    state.sessions.touch(connection_id);
    (
        ClientHandle {
            id: connection_id,
            writer,
        },
        client_side,
    )
}
