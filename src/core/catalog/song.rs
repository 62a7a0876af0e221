// src/core/catalog/song.rs

//! The catalog's domain types: songs and playlists.

use std::fmt;

/// A song in the global catalog. Identity is the case-insensitive
/// (name, singer) pair; the play count mutates monotonically on each
/// successful play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    pub name: String,
    pub singer: String,
    pub play_count: u64,
}

impl Song {
    pub fn new(name: impl Into<String>, singer: impl Into<String>, play_count: u64) -> Self {
        Self {
            name: name.into(),
            singer: singer.into(),
            play_count,
        }
    }

    /// Identity comparison: case-insensitive on both name and singer.
    pub fn matches(&self, name: &str, singer: &str) -> bool {
        self.name.eq_ignore_ascii_case(name) && self.singer.eq_ignore_ascii_case(singer)
    }

    /// Identity comparison against another song.
    pub fn same_identity(&self, other: &Song) -> bool {
        self.matches(&other.name, &other.singer)
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Song: {} By {}", self.name, self.singer)
    }
}

/// A named collection of songs. Identity is the exact playlist name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub name: String,
    pub songs: Vec<Song>,
}

impl Playlist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            songs: Vec::new(),
        }
    }

    pub fn contains(&self, song: &Song) -> bool {
        self.songs.iter().any(|s| s.same_identity(song))
    }
}

impl fmt::Display for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Playlist {}:", self.name)?;
        let mut first = true;
        for song in &self.songs {
            if !first {
                writeln!(f)?;
            }
            write!(f, "{song}")?;
            first = false;
        }
        Ok(())
    }
}
