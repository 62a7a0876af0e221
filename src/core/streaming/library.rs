// src/core/streaming/library.rs

//! Resolves a catalog song to its audio source.

use super::format::{AudioFormat, read_wav_format};
use crate::core::CadenzaError;
use crate::core::catalog::Song;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::AsyncRead;

/// An opened audio source: the advertised format plus the sample bytes.
pub struct AudioSource {
    pub format: AudioFormat,
    pub reader: Box<dyn AsyncRead + Send + Unpin>,
}

/// Maps songs to audio sources. The filesystem implementation is the
/// production one; tests inject stubs with in-memory sample data.
#[async_trait]
pub trait AudioLibrary: Send + Sync {
    async fn open(&self, song: &Song) -> Result<AudioSource, CadenzaError>;
}

/// A directory of WAV files named `<NameNoWhitespace>By<SingerNoWhitespace>.wav`.
pub struct FsAudioLibrary {
    music_dir: PathBuf,
}

impl FsAudioLibrary {
    pub fn new(music_dir: PathBuf) -> Self {
        Self { music_dir }
    }

    pub fn audio_path(&self, song: &Song) -> PathBuf {
        let squash = |s: &str| -> String { s.chars().filter(|c| !c.is_whitespace()).collect() };
        self.music_dir
            .join(format!("{}By{}.wav", squash(&song.name), squash(&song.singer)))
    }
}

#[async_trait]
impl AudioLibrary for FsAudioLibrary {
    async fn open(&self, song: &Song) -> Result<AudioSource, CadenzaError> {
        let path = self.audio_path(song);
        let mut file = match File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CadenzaError::UnsupportedAudio(format!(
                    "No audio file at {}",
                    path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };
        let format = read_wav_format(&mut file).await?;
        Ok(AudioSource {
            format,
            reader: Box::new(file),
        })
    }
}
