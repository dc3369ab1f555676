//! Library-backed production engine.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::audio;
use crate::engine::TranscriptionEngine;
use crate::error::{MurmurError, Result};
use crate::native::context::{self, ContextManager};
use crate::native::library::{default_candidates, LoadedLibrary};

/// Drives the native engine's C ABI.
///
/// The dynamic library is resolved on first `initialize` and cached for the
/// life of the engine; model contexts come and go underneath it.
pub struct NativeEngine {
    candidates: Vec<PathBuf>,
    library: Option<LoadedLibrary>,
    manager: Option<ContextManager>,
}

impl NativeEngine {
    /// Engine that will try `candidates` in order on first initialization.
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self {
            candidates,
            library: None,
            manager: None,
        }
    }

    /// Engine probing the standard platform locations.
    pub fn with_default_candidates() -> Self {
        Self::new(default_candidates())
    }
}

impl TranscriptionEngine for NativeEngine {
    fn initialize(&mut self, model_path: &Path) -> Result<()> {
        // Resolution happens once; later initializations reuse the module.
        let library = match self.library.take() {
            Some(lib) => lib,
            None => LoadedLibrary::resolve(&self.candidates)?,
        };
        let mut manager = self
            .manager
            .take()
            .unwrap_or_else(|| ContextManager::new(*library.vtable()));

        let outcome = manager.initialize(model_path);
        self.library = Some(library);
        self.manager = Some(manager);
        outcome
    }

    fn transcribe(&mut self, audio_path: &Path) -> Result<String> {
        let (library, manager) = match (self.library.as_ref(), self.manager.as_ref()) {
            (Some(library), Some(manager)) => (library, manager),
            _ => return Err(MurmurError::NotInitialized),
        };
        let Some(ctx) = manager.context() else {
            return Err(MurmurError::NotInitialized);
        };

        // Validate the container up front so malformed audio surfaces as a
        // typed decode error instead of an opaque engine failure.
        let bytes = std::fs::read(audio_path)?;
        let buffer = audio::decode(&bytes)?;
        debug!(
            samples = buffer.sample_count(),
            secs = buffer.duration_secs(),
            "audio validated, invoking engine"
        );

        context::transcribe_file(library.vtable(), ctx, audio_path)
    }

    fn shutdown(&mut self) {
        if let Some(manager) = self.manager.as_mut() {
            manager.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcribe_before_initialize_does_no_work() {
        let mut engine = NativeEngine::new(vec![]);
        // The path does not exist; NotInitialized (not an IO error) proves
        // nothing was read and no native call was attempted.
        let err = engine
            .transcribe(Path::new("/no/such/recording.wav"))
            .expect_err("must fail");
        assert!(matches!(err, MurmurError::NotInitialized));
    }

    #[test]
    fn initialize_reports_every_failed_candidate() {
        let candidates = vec![
            PathBuf::from("/nonexistent/a/libwhisper_ffi.so"),
            PathBuf::from("/nonexistent/b/libwhisper_ffi.so"),
        ];
        let mut engine = NativeEngine::new(candidates.clone());

        let err = engine
            .initialize(Path::new("/irrelevant/model.bin"))
            .expect_err("no library to load");
        match err {
            MurmurError::LibraryNotFound { attempts } => {
                assert_eq!(attempts.len(), 2);
                for (attempt, candidate) in attempts.iter().zip(&candidates) {
                    assert_eq!(&attempt.path, candidate);
                    assert!(!attempt.cause.is_empty());
                }
            }
            other => panic!("expected LibraryNotFound, got {other}"),
        }
    }

    #[test]
    fn shutdown_without_initialization_is_a_no_op() {
        let mut engine = NativeEngine::with_default_candidates();
        engine.shutdown();
        engine.shutdown();
    }
}
