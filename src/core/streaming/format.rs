// src/core/streaming/format.rs

//! The audio format-description message and the WAV header reader that
//! produces it.
//!
//! The format message is the first thing written on the data plane after a
//! `play`; clients configure their audio output from it before interpreting
//! any further bytes as samples. The JSON field names are part of the wire
//! contract.

use crate::core::CadenzaError;
use serde::{Deserialize, Serialize};
use std::io::SeekFrom;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

/// Name of the sample encoding, nested to match the wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioEncoding {
    pub name: String,
}

/// Describes the sample layout of a stream, sent as one JSON message before
/// the first audio chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFormat {
    pub encoding: AudioEncoding,
    pub sample_rate: f32,
    pub sample_size_in_bits: u16,
    pub channels: u16,
    pub frame_size: u16,
    pub frame_rate: f32,
    pub big_endian: bool,
}

/// Reads the RIFF/WAVE header chunks and leaves the reader positioned at the
/// first byte of audio data.
///
/// Only the canonical chunk layout is interpreted: a `fmt ` chunk somewhere
/// before the `data` chunk, unknown chunks skipped. Compressed WAV variants
/// beyond PCM/float/A-law/mu-law are rejected.
pub async fn read_wav_format<R>(reader: &mut R) -> Result<AudioFormat, CadenzaError>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    let mut riff = [0u8; 12];
    reader
        .read_exact(&mut riff)
        .await
        .map_err(|_| CadenzaError::UnsupportedAudio("Truncated RIFF header".to_string()))?;
    if &riff[0..4] != b"RIFF" || &riff[8..12] != b"WAVE" {
        return Err(CadenzaError::UnsupportedAudio(
            "Not a RIFF/WAVE audio file".to_string(),
        ));
    }

    let mut format: Option<AudioFormat> = None;
    loop {
        let mut chunk_header = [0u8; 8];
        if reader.read_exact(&mut chunk_header).await.is_err() {
            return Err(CadenzaError::UnsupportedAudio(
                "No data chunk in audio file".to_string(),
            ));
        }
        let chunk_id = [
            chunk_header[0],
            chunk_header[1],
            chunk_header[2],
            chunk_header[3],
        ];
        let chunk_size = u32::from_le_bytes([
            chunk_header[4],
            chunk_header[5],
            chunk_header[6],
            chunk_header[7],
        ]) as u64;

        match &chunk_id {
            b"fmt " => {
                if chunk_size < 16 {
                    return Err(CadenzaError::UnsupportedAudio(
                        "Malformed fmt chunk".to_string(),
                    ));
                }
                let mut fmt = [0u8; 16];
                reader.read_exact(&mut fmt).await.map_err(|_| {
                    CadenzaError::UnsupportedAudio("Truncated fmt chunk".to_string())
                })?;
                format = Some(parse_fmt_chunk(&fmt)?);
                // Skip any fmt extension plus the pad byte of an odd-sized chunk.
                let remainder = chunk_size - 16 + (chunk_size & 1);
                if remainder > 0 {
                    reader.seek(SeekFrom::Current(remainder as i64)).await?;
                }
            }
            b"data" => {
                return format.ok_or_else(|| {
                    CadenzaError::UnsupportedAudio(
                        "Data chunk precedes fmt chunk".to_string(),
                    )
                });
            }
            _ => {
                let skip = chunk_size + (chunk_size & 1);
                reader.seek(SeekFrom::Current(skip as i64)).await?;
            }
        }
    }
}

fn parse_fmt_chunk(fmt: &[u8; 16]) -> Result<AudioFormat, CadenzaError> {
    let audio_format = u16::from_le_bytes([fmt[0], fmt[1]]);
    let channels = u16::from_le_bytes([fmt[2], fmt[3]]);
    let sample_rate = u32::from_le_bytes([fmt[4], fmt[5], fmt[6], fmt[7]]);
    let block_align = u16::from_le_bytes([fmt[12], fmt[13]]);
    let bits_per_sample = u16::from_le_bytes([fmt[14], fmt[15]]);

    let encoding = match audio_format {
        1 => "PCM_SIGNED",
        3 => "PCM_FLOAT",
        6 => "ALAW",
        7 => "ULAW",
        other => {
            return Err(CadenzaError::UnsupportedAudio(format!(
                "Unsupported WAV format tag {other}"
            )));
        }
    };

    Ok(AudioFormat {
        encoding: AudioEncoding {
            name: encoding.to_string(),
        },
        sample_rate: sample_rate as f32,
        sample_size_in_bits: bits_per_sample,
        channels,
        frame_size: block_align,
        frame_rate: sample_rate as f32,
        big_endian: false,
    })
}
