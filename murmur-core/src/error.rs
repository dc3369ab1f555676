use std::path::PathBuf;

use thiserror::Error;

/// One failed attempt to load a native library candidate.
#[derive(Debug, Clone)]
pub struct LibraryAttempt {
    /// The candidate path or bare name handed to the system loader.
    pub path: PathBuf,
    /// The loader's error for this candidate.
    pub cause: String,
}

/// All errors produced by murmur-core.
///
/// Every native-boundary failure is converted to one of these at the edge;
/// raw error codes and null pointers never reach callers.
#[derive(Debug, Error)]
pub enum MurmurError {
    #[error("native library not found; tried {}", format_attempts(.attempts))]
    LibraryNotFound { attempts: Vec<LibraryAttempt> },

    #[error("native library {path:?} is missing required symbol `{symbol}`")]
    SymbolResolutionFailure { symbol: String, path: PathBuf },

    #[error("model initialization failed for {path:?}: {detail}")]
    ModelInitFailure { path: PathBuf, detail: String },

    #[error("not a RIFF/WAVE container")]
    InvalidContainer,

    #[error("unsupported audio codec (format code {format}, expected integer PCM)")]
    UnsupportedCodec { format: u16 },

    #[error("unsupported channel count {channels} (engine is mono-only)")]
    ChannelCountUnsupported { channels: u16 },

    #[error("unsupported bit depth {bits} (expected 16-bit samples)")]
    UnsupportedBitDepth { bits: u16 },

    #[error("audio stream contains no samples")]
    EmptyAudio,

    #[error("native inference call failed")]
    InferenceFailure,

    #[error("timed out waiting for the transcription worker")]
    Timeout,

    #[error("no model is loaded; call initialize first")]
    NotInitialized,

    #[error("transcription worker is no longer running")]
    WorkerStopped,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn format_attempts(attempts: &[LibraryAttempt]) -> String {
    if attempts.is_empty() {
        return "no candidates".to_string();
    }
    attempts
        .iter()
        .map(|a| format!("{} ({})", a.path.display(), a.cause))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, MurmurError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_not_found_lists_every_attempt() {
        let err = MurmurError::LibraryNotFound {
            attempts: vec![
                LibraryAttempt {
                    path: PathBuf::from("/opt/engine/libwhisper_ffi.so"),
                    cause: "file not found".into(),
                },
                LibraryAttempt {
                    path: PathBuf::from("libwhisper_ffi.so"),
                    cause: "cannot open shared object".into(),
                },
            ],
        };

        let message = err.to_string();
        assert!(message.contains("/opt/engine/libwhisper_ffi.so"));
        assert!(message.contains("libwhisper_ffi.so"));
        assert!(message.contains("cannot open shared object"));
    }

    #[test]
    fn io_errors_convert_automatically() {
        fn read_missing() -> Result<Vec<u8>> {
            Ok(std::fs::read("/definitely/not/a/real/path")?)
        }

        assert!(matches!(read_missing(), Err(MurmurError::Io(_))));
    }
}
