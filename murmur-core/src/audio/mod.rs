//! Audio container decoding.
//!
//! The engine consumes recorded WAV files directly, so decoding here is
//! pre-flight validation: malformed input becomes a typed error before any
//! native call happens, and the stub engine gets real samples to work with.

pub mod wav;

pub use wav::{decode, WavFormat, TARGET_SAMPLE_RATE};

/// Mono PCM samples normalized to [-1.0, 1.0], plus the source format.
///
/// Guaranteed non-empty: a stream that decodes to zero samples is a decode
/// failure, never an empty buffer. A buffer lives for a single transcription
/// call and is dropped when the call returns.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    format: WavFormat,
}

impl SampleBuffer {
    pub(crate) fn new(samples: Vec<f32>, format: WavFormat) -> Self {
        debug_assert!(!samples.is_empty());
        Self { samples, format }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn format(&self) -> &WavFormat {
        &self.format
    }

    /// Duration of the decoded audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.format.sample_rate)
    }

    /// Largest absolute sample value in the buffer.
    pub fn peak_amplitude(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
    }
}
