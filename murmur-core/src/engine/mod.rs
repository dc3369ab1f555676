//! Transcription engine abstraction.
//!
//! `TranscriptionEngine` decouples the worker from any specific backend:
//! the library-backed [`NativeEngine`] in production, the deterministic
//! [`StubEngine`] in development and tests. The implementation is chosen
//! once, when the worker is spawned, not per call.

pub mod native;
pub mod stub;

pub use native::NativeEngine;
pub use stub::StubEngine;

use std::path::Path;

use crate::error::Result;

/// Contract for transcription backends.
///
/// `&mut self` throughout: backends hold loaded libraries and model
/// contexts, and the worker's single-threaded loop is the only caller.
pub trait TranscriptionEngine: Send + 'static {
    /// Load (or reload) the model at `model_path`.
    ///
    /// Reinitializing releases the previous model before acquiring the new
    /// one; two loaded models never coexist.
    fn initialize(&mut self, model_path: &Path) -> Result<()>;

    /// Transcribe a recorded WAV file, returning the transcript text.
    ///
    /// Empty text is a legitimate result (no speech in the recording), not
    /// an error.
    ///
    /// # Errors
    /// `NotInitialized` when no model has been loaded yet, decode errors
    /// for malformed audio, `InferenceFailure` when the engine rejects the
    /// call.
    fn transcribe(&mut self, audio_path: &Path) -> Result<String>;

    /// Release everything the backend holds. Idempotent; a later
    /// `initialize` starts fresh.
    fn shutdown(&mut self);
}
