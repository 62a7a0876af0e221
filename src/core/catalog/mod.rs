// src/core/catalog/mod.rs

//! The song and playlist catalog.
//!
//! All tables live in memory behind locks and are written through to the
//! store on mutation. Reads and play-count increments arrive concurrently
//! from connection handler tasks and stream tasks, so every table access goes
//! through the lock; writes snapshot under the lock and persist after
//! releasing it, keeping file I/O off the critical section.

mod song;
mod store;

pub use song::{Playlist, Song};
pub use store::{CatalogStore, FIELD_SEPARATOR, FsCatalogStore, decode_field, encode_field};

use crate::core::CadenzaError;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;

/// The catalog service: searches, rankings, playlist management and play
/// accounting over an injected [`CatalogStore`].
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    songs: RwLock<Vec<Song>>,
    playlists: RwLock<Vec<Playlist>>,
}

impl CatalogService {
    /// Loads the catalog from the store. Corrupt records are a startup
    /// failure; the service never starts with a partial table.
    pub async fn load(store: Arc<dyn CatalogStore>) -> Result<Self, CadenzaError> {
        let songs = store.load_songs().await?;
        let playlists = store.load_playlists().await?;
        Ok(Self {
            store,
            songs: RwLock::new(songs),
            playlists: RwLock::new(playlists),
        })
    }

    /// Returns every song whose name or singer contains at least one of the
    /// keywords as a whole word, case-insensitively.
    pub fn search(&self, keywords: &[String]) -> Vec<Song> {
        let wanted: HashSet<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
        self.songs
            .read()
            .iter()
            .filter(|song| {
                song.name
                    .split_whitespace()
                    .chain(song.singer.split_whitespace())
                    .any(|word| wanted.contains(&word.to_lowercase()))
            })
            .cloned()
            .collect()
    }

    /// Returns at most `number` songs ordered by descending play count.
    /// A non-positive `number` is rejected before the table is consulted.
    pub fn top(&self, number: i64) -> Result<Vec<Song>, CadenzaError> {
        if number <= 0 {
            return Err(CadenzaError::NotPositiveNumber);
        }
        let mut songs: Vec<Song> = self.songs.read().clone();
        songs.sort_by(|a, b| b.play_count.cmp(&a.play_count));
        songs.truncate(number as usize);
        Ok(songs)
    }

    /// Resolves a song by its case-insensitive (name, singer) identity.
    pub fn song(&self, name: &str, singer: &str) -> Result<Song, CadenzaError> {
        self.songs
            .read()
            .iter()
            .find(|s| s.matches(name, singer))
            .cloned()
            .ok_or_else(|| CadenzaError::SongNotFound {
                name: name.to_string(),
                singer: singer.to_string(),
            })
    }

    /// Increments the play count of a song and persists the whole song table.
    /// Returns the song as it was after the increment.
    pub async fn record_play(&self, name: &str, singer: &str) -> Result<Song, CadenzaError> {
        let (played, snapshot) = {
            let mut songs = self.songs.write();
            let song = songs
                .iter_mut()
                .find(|s| s.matches(name, singer))
                .ok_or_else(|| CadenzaError::SongNotFound {
                    name: name.to_string(),
                    singer: singer.to_string(),
                })?;
            song.play_count += 1;
            (song.clone(), songs.clone())
        };
        self.store.save_songs(&snapshot).await?;
        Ok(played)
    }

    /// Creates an empty playlist. Playlist identity is the exact name.
    pub async fn create_playlist(&self, name: &str) -> Result<(), CadenzaError> {
        {
            let mut playlists = self.playlists.write();
            if playlists.iter().any(|p| p.name == name) {
                return Err(CadenzaError::PlaylistAlreadyExists);
            }
            playlists.push(Playlist::new(name));
        }
        self.store.create_playlist(name).await
    }

    /// Adds a catalog song to an existing playlist.
    pub async fn add_song_to(
        &self,
        playlist_name: &str,
        song_name: &str,
        singer: &str,
    ) -> Result<(), CadenzaError> {
        let song = self.song(song_name, singer)?;
        {
            let mut playlists = self.playlists.write();
            let playlist = playlists
                .iter_mut()
                .find(|p| p.name == playlist_name)
                .ok_or_else(|| CadenzaError::PlaylistNotFound(playlist_name.to_string()))?;
            if playlist.contains(&song) {
                return Err(CadenzaError::SongAlreadyInPlaylist {
                    song: song.name.clone(),
                    playlist: playlist_name.to_string(),
                });
            }
            playlist.songs.push(song.clone());
        }
        self.store.append_song(playlist_name, &song).await
    }

    /// Looks up a playlist by its exact name.
    pub fn playlist_named(&self, name: &str) -> Result<Playlist, CadenzaError> {
        self.playlists
            .read()
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .ok_or_else(|| CadenzaError::PlaylistNotFound(name.to_string()))
    }
}
