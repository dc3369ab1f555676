//! WAV (RIFF) parsing for mono 16-bit integer PCM.
//!
//! ## Layout handled
//!
//! A RIFF header followed by tagged chunks (4-byte id + 4-byte little-endian
//! size). Chunks are scanned sequentially and unknown ones (`LIST`, `fact`,
//! padding, ...) are skipped by their declared size; recorders routinely emit
//! metadata chunks ahead of `fmt `, so fixed-offset reads are wrong.
//!
//! ## Validation
//!
//! Integer PCM only, mono only, 16-bit only. 16 kHz is the rate the engine
//! is tuned for; other rates decode fine but log a warning.

use tracing::{debug, warn};

use crate::audio::SampleBuffer;
use crate::error::{MurmurError, Result};

/// Sample rate the engine expects for best accuracy (Hz).
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Format code for uncompressed integer PCM.
const PCM_FORMAT_CODE: u16 = 1;

const RIFF_HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;
const FMT_CHUNK_MIN_LEN: usize = 16;

/// Contents of the container's `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    pub audio_format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

/// Decode a WAV byte stream into normalized mono samples.
///
/// # Errors
/// - `EmptyAudio` for a zero-byte stream or a `data` chunk with no samples.
/// - `InvalidContainer` for bad magic bytes, a truncated chunk, or a
///   missing `fmt `/`data` chunk.
/// - `UnsupportedCodec` / `ChannelCountUnsupported` / `UnsupportedBitDepth`
///   when the format chunk violates the engine's input contract.
pub fn decode(bytes: &[u8]) -> Result<SampleBuffer> {
    if bytes.is_empty() {
        return Err(MurmurError::EmptyAudio);
    }
    if bytes.len() < RIFF_HEADER_LEN || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(MurmurError::InvalidContainer);
    }

    let (fmt_body, fmt_end) = find_chunk(bytes, RIFF_HEADER_LEN, b"fmt ")?;
    let format = parse_format(fmt_body)?;
    validate_format(&format)?;

    let (data_body, _) = find_chunk(bytes, fmt_end, b"data")?;
    if data_body.is_empty() {
        return Err(MurmurError::EmptyAudio);
    }

    let sample_count = data_body.len() / usize::from(format.bits_per_sample / 8);
    let mut samples = Vec::with_capacity(sample_count);
    for pair in data_body.chunks_exact(2) {
        let value = i16::from_le_bytes([pair[0], pair[1]]);
        samples.push(f32::from(value) / 32_768.0);
    }
    if samples.is_empty() {
        return Err(MurmurError::EmptyAudio);
    }

    debug!(
        samples = samples.len(),
        sample_rate = format.sample_rate,
        "decoded wav stream"
    );
    Ok(SampleBuffer::new(samples, format))
}

/// Scan chunks from `start`, skipping non-matching ones by declared size.
/// Returns the matching chunk's body and the offset just past it.
fn find_chunk<'a>(bytes: &'a [u8], start: usize, id: &[u8; 4]) -> Result<(&'a [u8], usize)> {
    let mut offset = start;
    while offset + CHUNK_HEADER_LEN <= bytes.len() {
        let chunk_id = &bytes[offset..offset + 4];
        let declared = u32::from_le_bytes([
            bytes[offset + 4],
            bytes[offset + 5],
            bytes[offset + 6],
            bytes[offset + 7],
        ]) as usize;

        let body_start = offset + CHUNK_HEADER_LEN;
        let body_end = body_start
            .checked_add(declared)
            .ok_or(MurmurError::InvalidContainer)?;
        if body_end > bytes.len() {
            return Err(MurmurError::InvalidContainer);
        }

        // RIFF chunks are word-aligned: an odd size carries one pad byte.
        let next = body_end + (declared & 1);

        if chunk_id == id {
            return Ok((&bytes[body_start..body_end], next));
        }
        offset = next;
    }
    Err(MurmurError::InvalidContainer)
}

fn parse_format(body: &[u8]) -> Result<WavFormat> {
    if body.len() < FMT_CHUNK_MIN_LEN {
        return Err(MurmurError::InvalidContainer);
    }
    Ok(WavFormat {
        audio_format: u16::from_le_bytes([body[0], body[1]]),
        channels: u16::from_le_bytes([body[2], body[3]]),
        sample_rate: u32::from_le_bytes([body[4], body[5], body[6], body[7]]),
        bits_per_sample: u16::from_le_bytes([body[14], body[15]]),
    })
}

fn validate_format(format: &WavFormat) -> Result<()> {
    if format.audio_format != PCM_FORMAT_CODE {
        return Err(MurmurError::UnsupportedCodec {
            format: format.audio_format,
        });
    }
    if format.channels != 1 {
        return Err(MurmurError::ChannelCountUnsupported {
            channels: format.channels,
        });
    }
    if format.sample_rate != TARGET_SAMPLE_RATE {
        warn!(
            sample_rate = format.sample_rate,
            "sample rate differs from the {} Hz the engine is tuned for; accuracy may suffer",
            TARGET_SAMPLE_RATE
        );
    }
    if format.bits_per_sample != 16 {
        return Err(MurmurError::UnsupportedBitDepth {
            bits: format.bits_per_sample,
        });
    }
    Ok(())
}
