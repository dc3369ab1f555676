//! `StubEngine` — deterministic backend with no native dependency.
//!
//! Mirrors the native engine's observable contract (initialization
//! preconditions, container validation, empty text for silent input) so the
//! whole worker path can be exercised without the engine library installed.

use std::path::Path;

use tracing::debug;

use crate::audio;
use crate::engine::TranscriptionEngine;
use crate::error::{MurmurError, Result};

/// Peak amplitude below which a recording is reported as silence.
const SILENCE_PEAK: f32 = 0.01;

/// Echo-style stub engine.
pub struct StubEngine {
    initialized: bool,
}

impl StubEngine {
    pub fn new() -> Self {
        Self { initialized: false }
    }
}

impl Default for StubEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptionEngine for StubEngine {
    fn initialize(&mut self, model_path: &Path) -> Result<()> {
        let meta = std::fs::metadata(model_path).map_err(|e| MurmurError::ModelInitFailure {
            path: model_path.to_path_buf(),
            detail: format!("model file is not readable: {e}"),
        })?;
        if meta.len() == 0 {
            return Err(MurmurError::ModelInitFailure {
                path: model_path.to_path_buf(),
                detail: "model file is empty".into(),
            });
        }
        debug!(path = %model_path.display(), "stub engine initialized");
        self.initialized = true;
        Ok(())
    }

    fn transcribe(&mut self, audio_path: &Path) -> Result<String> {
        if !self.initialized {
            return Err(MurmurError::NotInitialized);
        }

        let bytes = std::fs::read(audio_path)?;
        let buffer = audio::decode(&bytes)?;

        if buffer.peak_amplitude() < SILENCE_PEAK {
            debug!(samples = buffer.sample_count(), "stub: silent input");
            return Ok(String::new());
        }
        Ok(format!(
            "[stub: {} samples @ {} Hz]",
            buffer.sample_count(),
            buffer.format().sample_rate
        ))
    }

    fn shutdown(&mut self) {
        self.initialized = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    fn write_model(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("model.bin");
        std::fs::write(&path, b"stub model weights").expect("write model");
        path
    }

    fn write_wav(dir: &tempfile::TempDir, name: &str, samples: &[i16], rate: u32) -> PathBuf {
        let path = dir.path().join(name);
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).expect("wav writer");
        for s in samples {
            writer.write_sample(*s).expect("write sample");
        }
        writer.finalize().expect("finalize wav");
        path
    }

    #[test]
    fn requires_initialization_before_transcribing() {
        let mut engine = StubEngine::new();
        let err = engine
            .transcribe(Path::new("/no/such/recording.wav"))
            .expect_err("must fail");
        assert!(matches!(err, MurmurError::NotInitialized));
    }

    #[test]
    fn missing_model_file_is_an_init_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut engine = StubEngine::new();
        let err = engine
            .initialize(&dir.path().join("missing.bin"))
            .expect_err("must fail");
        assert!(matches!(err, MurmurError::ModelInitFailure { .. }));
    }

    #[test]
    fn silence_yields_empty_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let model = write_model(&dir);
        let wav = write_wav(&dir, "silence.wav", &vec![0i16; 1_600], 16_000);

        let mut engine = StubEngine::new();
        engine.initialize(&model).expect("initialize");
        assert_eq!(engine.transcribe(&wav).expect("transcribe"), "");
    }

    #[test]
    fn audible_input_is_reported_deterministically() {
        let dir = tempfile::tempdir().expect("tempdir");
        let model = write_model(&dir);
        let wav = write_wav(&dir, "tone.wav", &vec![16_384i16; 1_600], 16_000);

        let mut engine = StubEngine::new();
        engine.initialize(&model).expect("initialize");
        let first = engine.transcribe(&wav).expect("transcribe");
        let second = engine.transcribe(&wav).expect("transcribe again");

        assert_eq!(first, "[stub: 1600 samples @ 16000 Hz]");
        assert_eq!(first, second);
    }

    #[test]
    fn shutdown_requires_reinitialization() {
        let dir = tempfile::tempdir().expect("tempdir");
        let model = write_model(&dir);
        let wav = write_wav(&dir, "tone.wav", &vec![16_384i16; 160], 16_000);

        let mut engine = StubEngine::new();
        engine.initialize(&model).expect("initialize");
        engine.shutdown();

        let err = engine.transcribe(&wav).expect_err("must fail");
        assert!(matches!(err, MurmurError::NotInitialized));
    }
}
