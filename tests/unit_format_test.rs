// tests/unit_format_test.rs

use cadenza::core::CadenzaError;
use cadenza::core::streaming::read_wav_format;
use std::io::Cursor;
use tokio::io::AsyncReadExt;

/// Builds a minimal RIFF/WAVE byte stream: optional extra chunk, a 16-byte
/// fmt chunk, then a data chunk with the given samples.
fn wav_bytes(format_tag: u16, channels: u16, sample_rate: u32, bits: u16, data: &[u8]) -> Vec<u8> {
    let block_align = channels * bits / 8;
    let byte_rate = sample_rate * block_align as u32;

    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&0u32.to_le_bytes()); // overall size, unchecked
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&format_tag.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(data);
    out
}

#[tokio::test]
async fn test_reads_canonical_pcm_header() {
    let bytes = wav_bytes(1, 2, 44_100, 16, &[1, 2, 3, 4]);
    let mut cursor = Cursor::new(bytes);
    let format = read_wav_format(&mut cursor).await.unwrap();

    assert_eq!(format.encoding.name, "PCM_SIGNED");
    assert_eq!(format.channels, 2);
    assert_eq!(format.sample_rate, 44_100.0);
    assert_eq!(format.sample_size_in_bits, 16);
    assert_eq!(format.frame_size, 4);
    assert_eq!(format.frame_rate, 44_100.0);
    assert!(!format.big_endian);
}

#[tokio::test]
async fn test_reader_is_left_at_first_audio_byte() {
    let bytes = wav_bytes(1, 1, 8_000, 8, &[9, 8, 7]);
    let mut cursor = Cursor::new(bytes);
    read_wav_format(&mut cursor).await.unwrap();

    let mut rest = Vec::new();
    cursor.read_to_end(&mut rest).await.unwrap();
    assert_eq!(rest, vec![9, 8, 7]);
}

#[tokio::test]
async fn test_skips_unknown_chunks_before_fmt() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    // A LIST chunk with 6 bytes of content (even, no pad byte).
    bytes.extend_from_slice(b"LIST");
    bytes.extend_from_slice(&6u32.to_le_bytes());
    bytes.extend_from_slice(b"INFOxy");
    // Splice the fmt + data chunks from a canonical file.
    let canonical = wav_bytes(1, 2, 22_050, 16, &[5, 5]);
    bytes.extend_from_slice(&canonical[12..]);

    let mut cursor = Cursor::new(bytes);
    let format = read_wav_format(&mut cursor).await.unwrap();
    assert_eq!(format.sample_rate, 22_050.0);

    let mut rest = Vec::new();
    cursor.read_to_end(&mut rest).await.unwrap();
    assert_eq!(rest, vec![5, 5]);
}

#[tokio::test]
async fn test_float_format_tag() {
    let bytes = wav_bytes(3, 1, 48_000, 32, &[]);
    let mut cursor = Cursor::new(bytes);
    let format = read_wav_format(&mut cursor).await.unwrap();
    assert_eq!(format.encoding.name, "PCM_FLOAT");
}

#[tokio::test]
async fn test_rejects_non_riff_input() {
    let mut cursor = Cursor::new(b"OggS garbage that is long enough".to_vec());
    let result = read_wav_format(&mut cursor).await;
    assert!(matches!(result, Err(CadenzaError::UnsupportedAudio(_))));
}

#[tokio::test]
async fn test_rejects_unsupported_format_tag() {
    let bytes = wav_bytes(2, 2, 44_100, 16, &[]); // ADPCM
    let mut cursor = Cursor::new(bytes);
    let result = read_wav_format(&mut cursor).await;
    assert!(matches!(result, Err(CadenzaError::UnsupportedAudio(_))));
}

#[tokio::test]
async fn test_rejects_missing_data_chunk() {
    let canonical = wav_bytes(1, 2, 44_100, 16, &[]);
    // Truncate right after the fmt chunk: no data chunk follows.
    let truncated = canonical[..12 + 8 + 16].to_vec();
    let mut cursor = Cursor::new(truncated);
    let result = read_wav_format(&mut cursor).await;
    assert!(matches!(result, Err(CadenzaError::UnsupportedAudio(_))));
}
