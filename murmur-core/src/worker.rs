//! Background transcription worker and its async caller handle.
//!
//! All native state lives on one dedicated thread consuming a closed set of
//! request variants in FIFO order. Callers talk to it exclusively through
//! message passing, so the model context needs no locking and at most one
//! native call is ever in flight.
//!
//! ```text
//! Transcriber (async, clonable)              worker thread (owns engine)
//!   initialize / transcribe / dispose ──req──▶ recv loop, one at a time
//!                   ▲                            │ engine.initialize()
//!                   │                            │ engine.transcribe()
//!                   └───────── oneshot reply ◀───┘
//! ```
//!
//! A timed-out caller stops waiting, but the native call has no
//! cancellation hook; the worker finishes it and then continues with
//! whatever is queued, still in order.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::engine::{NativeEngine, TranscriptionEngine};
use crate::error::{MurmurError, Result};
use crate::native::library::default_candidates;
use crate::types::TranscriptionResult;

/// How long a caller waits for a worker reply before giving up.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(300);

/// Tunables for [`Transcriber::spawn`].
#[derive(Debug, Clone)]
pub struct TranscriberConfig {
    /// Native library locations to try, in order (native engine only).
    pub library_candidates: Vec<PathBuf>,
    /// Reply timeout applied to every request unless overridden per call.
    pub reply_timeout: Duration,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            library_candidates: default_candidates(),
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        }
    }
}

enum Request {
    Initialize {
        model_path: PathBuf,
        reply: oneshot::Sender<Result<()>>,
    },
    Transcribe {
        audio_path: PathBuf,
        reply: oneshot::Sender<Result<String>>,
    },
    Dispose {
        reply: oneshot::Sender<()>,
    },
}

/// Async handle to the transcription worker.
///
/// Cheap to clone; all clones feed the same FIFO queue. Safe to call from
/// the application's primary thread: requests suspend on a oneshot reply
/// instead of blocking.
#[derive(Clone)]
pub struct Transcriber {
    tx: Sender<Request>,
    reply_timeout: Duration,
    join: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Transcriber {
    /// Spawn the worker thread around `engine`.
    ///
    /// The backend is chosen exactly once, here; the worker never switches
    /// engines mid-flight.
    pub fn spawn<E: TranscriptionEngine>(engine: E, config: TranscriberConfig) -> Self {
        let (tx, rx) = unbounded();
        let handle = thread::spawn(move || run_worker(Box::new(engine), rx));

        Self {
            tx,
            reply_timeout: config.reply_timeout,
            join: Arc::new(Mutex::new(Some(handle))),
        }
    }

    /// Spawn with a [`NativeEngine`] built from `config`'s candidate list.
    pub fn native(config: TranscriberConfig) -> Self {
        let engine = NativeEngine::new(config.library_candidates.clone());
        Self::spawn(engine, config)
    }

    /// Load the model at `model_path`, resolving the native library first
    /// if that has not happened yet. Safe to call again to swap models.
    pub async fn initialize(&self, model_path: impl Into<PathBuf>) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Request::Initialize {
            model_path: model_path.into(),
            reply: reply_tx,
        })?;
        self.await_reply(reply_rx, self.reply_timeout).await?
    }

    /// Transcribe the WAV file at `audio_path`, then derive keywords from
    /// the returned text in the caller's execution context.
    pub async fn transcribe(&self, audio_path: impl Into<PathBuf>) -> Result<TranscriptionResult> {
        self.transcribe_with_timeout(audio_path, self.reply_timeout)
            .await
    }

    /// [`transcribe`](Self::transcribe) with a per-request reply timeout.
    ///
    /// On timeout the request is not cancelled: the worker finishes the
    /// native call and then moves on to whatever is queued behind it.
    pub async fn transcribe_with_timeout(
        &self,
        audio_path: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Result<TranscriptionResult> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Request::Transcribe {
            audio_path: audio_path.into(),
            reply: reply_tx,
        })?;
        let text = self.await_reply(reply_rx, timeout).await??;
        Ok(TranscriptionResult::from_transcript(text))
    }

    /// Release all native resources and stop the worker.
    ///
    /// Requests sent afterwards fail with `WorkerStopped`; disposing an
    /// already-stopped worker is a no-op.
    pub async fn dispose(&self) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.tx.send(Request::Dispose { reply: reply_tx }).is_err() {
            return Ok(()); // already stopped
        }
        match self.await_reply(reply_rx, self.reply_timeout).await {
            // A racing dispose may win; the worker is gone either way.
            Ok(()) | Err(MurmurError::WorkerStopped) => {}
            Err(other) => return Err(other),
        }
        if let Some(handle) = self.join.lock().take() {
            let _ = handle.join();
        }
        Ok(())
    }

    fn send(&self, request: Request) -> Result<()> {
        self.tx.send(request).map_err(|_| MurmurError::WorkerStopped)
    }

    async fn await_reply<T>(&self, rx: oneshot::Receiver<T>, timeout: Duration) -> Result<T> {
        match tokio::time::timeout(timeout, rx).await {
            Err(_) => Err(MurmurError::Timeout),
            Ok(Err(_)) => Err(MurmurError::WorkerStopped),
            Ok(Ok(value)) => Ok(value),
        }
    }
}

impl std::fmt::Debug for Transcriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transcriber")
            .field("reply_timeout", &self.reply_timeout)
            .finish_non_exhaustive()
    }
}

fn run_worker(mut engine: Box<dyn TranscriptionEngine>, rx: Receiver<Request>) {
    info!("transcription worker started");

    while let Ok(request) = rx.recv() {
        match request {
            Request::Initialize { model_path, reply } => {
                let outcome = engine.initialize(&model_path);
                if let Err(ref e) = outcome {
                    warn!(path = %model_path.display(), error = %e, "initialization failed");
                }
                let _ = reply.send(outcome);
            }
            Request::Transcribe { audio_path, reply } => {
                let started = Instant::now();
                let outcome = engine.transcribe(&audio_path);
                info!(
                    path = %audio_path.display(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    ok = outcome.is_ok(),
                    "transcription request finished"
                );
                if reply.send(outcome).is_err() {
                    // Caller timed out and went away. The result is lost but
                    // the queue keeps its order.
                    debug!("transcription reply dropped; caller gave up waiting");
                }
            }
            Request::Dispose { reply } => {
                engine.shutdown();
                info!("transcription worker disposed");
                let _ = reply.send(());
                return;
            }
        }
    }

    // All handles dropped without an explicit dispose; release native
    // resources before the thread exits.
    engine.shutdown();
    info!("transcription worker stopped; request channel closed");
}
