//! # murmur-core
//!
//! Offline speech-to-text bridge: hand a recorded WAV file to a native
//! inference engine and get a transcript back, with no network access.
//!
//! ## Architecture
//!
//! ```text
//! caller (async) ──Request──▶ worker thread (owns all native state)
//!                                 ├─ LoadedLibrary   dlopen + 4 entry points
//!                                 ├─ ModelContext    native handle, freed once
//!                                 ├─ wav::decode     pre-flight validation
//!                                 └─ transcribe      native string → owned String
//!        ◀─── oneshot reply (timeout-guarded) ───────┘
//!
//! keywords::extract runs caller-side on the returned transcript.
//! ```
//!
//! The worker is a single-threaded message loop: requests are processed in
//! arrival order and at most one native call is in flight per model
//! context, so the native handle never needs a lock.
//!
//! `unsafe` is confined to the `native` module; every native allocation is
//! wrapped in an owner that releases it on drop.

#![warn(clippy::all)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod audio;
pub mod engine;
pub mod error;
pub mod keywords;
pub mod native;
pub mod types;
pub mod worker;

// Convenience re-exports for downstream crates
pub use engine::{NativeEngine, StubEngine, TranscriptionEngine};
pub use error::{LibraryAttempt, MurmurError, Result};
pub use types::TranscriptionResult;
pub use worker::{Transcriber, TranscriberConfig};
