//! Result payloads returned to callers.

use serde::{Deserialize, Serialize};

use crate::keywords;

/// Outcome of a successful transcription.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionResult {
    /// Recognized text. Empty when the engine found no speech; that is a
    /// successful result, not an error.
    pub text: String,
    /// Ranked keywords derived from `text` (at most ten).
    pub keywords: Vec<String>,
}

impl TranscriptionResult {
    /// Build a result from engine output, deriving keywords on the spot.
    pub fn from_transcript(text: String) -> Self {
        let keywords = keywords::extract(&text);
        Self { text, keywords }
    }

    /// Whether the engine recognized any speech at all.
    pub fn is_speech_detected(&self) -> bool {
        !self.text.trim().is_empty()
    }
}
