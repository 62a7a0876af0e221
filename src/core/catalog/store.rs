// src/core/catalog/store.rs

//! Flat-file persistence for the catalog.
//!
//! Files are line-oriented and space-delimited; spaces *inside* a single
//! field are encoded with the fixed separator character so a field always
//! occupies exactly one token. [`encode_field`] and [`decode_field`] are the
//! two halves of that round-trip contract.

use super::song::{Playlist, Song};
use crate::core::CadenzaError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Separator standing in for whitespace inside a persisted field.
pub const FIELD_SEPARATOR: char = '-';

const PLAYLIST_FILE_EXTENSION: &str = "txt";

/// Replaces every whitespace character of a field with the separator.
pub fn encode_field(field: &str) -> String {
    field
        .chars()
        .map(|ch| if ch.is_whitespace() { FIELD_SEPARATOR } else { ch })
        .collect()
}

/// Restores the spaces of an encoded field. Trailing separators decode to
/// nothing, mirroring the encoder's source format.
pub fn decode_field(encoded: &str) -> String {
    let mut parts: Vec<&str> = encoded.split(FIELD_SEPARATOR).collect();
    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    parts.join(" ")
}

/// Storage backend for songs and playlists. The filesystem implementation is
/// the production one; tests inject in-memory implementations.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn load_songs(&self) -> Result<Vec<Song>, CadenzaError>;
    async fn save_songs(&self, songs: &[Song]) -> Result<(), CadenzaError>;
    async fn load_playlists(&self) -> Result<Vec<Playlist>, CadenzaError>;
    async fn create_playlist(&self, name: &str) -> Result<(), CadenzaError>;
    async fn append_song(&self, playlist: &str, song: &Song) -> Result<(), CadenzaError>;
}

/// Catalog persistence over one songs file and a directory with one file per
/// playlist.
pub struct FsCatalogStore {
    songs_file: PathBuf,
    playlists_dir: PathBuf,
}

impl FsCatalogStore {
    pub fn new(songs_file: PathBuf, playlists_dir: PathBuf) -> Self {
        Self {
            songs_file,
            playlists_dir,
        }
    }

    fn playlist_path(&self, name: &str) -> PathBuf {
        self.playlists_dir
            .join(format!("{}.{PLAYLIST_FILE_EXTENSION}", encode_field(name)))
    }
}

#[async_trait]
impl CatalogStore for FsCatalogStore {
    async fn load_songs(&self) -> Result<Vec<Song>, CadenzaError> {
        let contents = fs::read_to_string(&self.songs_file).await?;
        let mut songs = Vec::new();
        for line in contents.lines().filter(|l| !l.trim().is_empty()) {
            songs.push(parse_song_line(line, true)?);
        }
        Ok(songs)
    }

    async fn save_songs(&self, songs: &[Song]) -> Result<(), CadenzaError> {
        let mut contents = String::new();
        for song in songs {
            contents.push_str(&format!(
                "{} {} {}\n",
                encode_field(&song.name),
                encode_field(&song.singer),
                song.play_count
            ));
        }
        fs::write(&self.songs_file, contents).await?;
        Ok(())
    }

    async fn load_playlists(&self) -> Result<Vec<Playlist>, CadenzaError> {
        let mut playlists = Vec::new();
        let mut entries = fs::read_dir(&self.playlists_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(PLAYLIST_FILE_EXTENSION) {
                continue;
            }
            playlists.push(load_playlist_file(&path).await?);
        }
        Ok(playlists)
    }

    async fn create_playlist(&self, name: &str) -> Result<(), CadenzaError> {
        fs::File::create(self.playlist_path(name)).await?;
        Ok(())
    }

    async fn append_song(&self, playlist: &str, song: &Song) -> Result<(), CadenzaError> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(self.playlist_path(playlist))
            .await?;
        let line = format!(
            "{} {}\n",
            encode_field(&song.name),
            encode_field(&song.singer)
        );
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

async fn load_playlist_file(path: &Path) -> Result<Playlist, CadenzaError> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| CadenzaError::Persistence(format!("Unreadable playlist file name: {}", path.display())))?;

    let mut playlist = Playlist::new(decode_field(stem));
    let contents = fs::read_to_string(path).await?;
    for line in contents.lines().filter(|l| !l.trim().is_empty()) {
        playlist.songs.push(parse_song_line(line, false)?);
    }
    Ok(playlist)
}

/// Parses one persisted song line. Playlist entries carry no play count; the
/// global songs file does.
fn parse_song_line(line: &str, with_count: bool) -> Result<Song, CadenzaError> {
    let tokens: Vec<&str> = line.split(' ').collect();
    let expected = if with_count { 3 } else { 2 };
    if tokens.len() != expected {
        return Err(CadenzaError::Persistence(format!(
            "Malformed song record (expected {expected} fields): {line:?}"
        )));
    }

    let play_count = if with_count {
        tokens[2].parse::<u64>().map_err(|_| {
            CadenzaError::Persistence(format!("Malformed play count in song record: {line:?}"))
        })?
    } else {
        0
    };

    Ok(Song::new(
        decode_field(tokens[0]),
        decode_field(tokens[1]),
        play_count,
    ))
}
