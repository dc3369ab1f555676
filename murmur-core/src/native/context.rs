//! Native model context ownership and the transcription call.
//!
//! Every allocation obtained from the engine is wrapped in an owner whose
//! `Drop` runs the matching release entry point, so cleanup happens on all
//! exit paths, including `?` early-returns.

use std::ffi::{c_char, c_void, CStr, CString};
use std::path::Path;

use anyhow::anyhow;
use tracing::{debug, info};

use super::{EngineVtable, FreeContextFn, FreeStringFn};
use crate::error::{MurmurError, Result};

/// Owned handle to a model loaded inside the native engine.
///
/// Single-owner by construction (no `Clone`); the release entry point runs
/// exactly once, on drop.
pub(crate) struct ModelContext {
    raw: *mut c_void,
    free: FreeContextFn,
}

// The handle has no thread affinity. It is only ever touched by the one
// worker thread that owns the enclosing engine.
unsafe impl Send for ModelContext {}

impl ModelContext {
    fn acquire(vtable: &EngineVtable, model_path: &Path) -> Result<Self> {
        let c_path = path_to_cstring(model_path)?;
        // SAFETY: c_path outlives the call; init returns either a handle we
        // now own or null.
        let raw = unsafe { (vtable.init)(c_path.as_ptr()) };
        if raw.is_null() {
            return Err(MurmurError::ModelInitFailure {
                path: model_path.to_path_buf(),
                detail: "engine returned a null context".into(),
            });
        }
        debug!("model context acquired");
        Ok(Self {
            raw,
            free: vtable.free_context,
        })
    }

    pub(crate) fn raw(&self) -> *mut c_void {
        self.raw
    }
}

impl Drop for ModelContext {
    fn drop(&mut self) {
        // SAFETY: raw came from init and has not been freed yet.
        unsafe { (self.free)(self.raw) };
        debug!("model context released");
    }
}

/// Owns at most one live [`ModelContext`] and serializes its lifecycle.
pub(crate) struct ContextManager {
    vtable: EngineVtable,
    context: Option<ModelContext>,
}

impl ContextManager {
    pub(crate) fn new(vtable: EngineVtable) -> Self {
        Self {
            vtable,
            context: None,
        }
    }

    /// Load the model at `model_path`, releasing any previously loaded
    /// context first so two never coexist.
    ///
    /// # Errors
    /// `ModelInitFailure` when the file is missing or empty, or when the
    /// engine rejects it.
    pub(crate) fn initialize(&mut self, model_path: &Path) -> Result<()> {
        check_model_file(model_path)?;
        if let Some(old) = self.context.take() {
            info!("releasing existing model context before reinitializing");
            drop(old);
        }
        self.context = Some(ModelContext::acquire(&self.vtable, model_path)?);
        info!(path = %model_path.display(), "model loaded");
        Ok(())
    }

    pub(crate) fn context(&self) -> Option<&ModelContext> {
        self.context.as_ref()
    }

    /// Release the live context, if any. Safe to call repeatedly.
    pub(crate) fn dispose(&mut self) {
        if self.context.take().is_some() {
            info!("model context disposed");
        }
    }
}

fn check_model_file(model_path: &Path) -> Result<()> {
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
    Ok(())
}

/// Engine-owned string, released through the engine's deallocator on drop.
struct NativeString {
    ptr: *mut c_char,
    free: FreeStringFn,
}

impl NativeString {
    fn from_raw(ptr: *mut c_char, free: FreeStringFn) -> Option<Self> {
        if ptr.is_null() {
            None
        } else {
            Some(Self { ptr, free })
        }
    }

    fn to_owned_string(&self) -> String {
        // SAFETY: ptr is non-null and null-terminated per the engine ABI.
        let c_str = unsafe { CStr::from_ptr(self.ptr) };
        c_str.to_string_lossy().into_owned()
    }
}

impl Drop for NativeString {
    fn drop(&mut self) {
        // SAFETY: ownership of ptr transferred to us at the transcribe call.
        unsafe { (self.free)(self.ptr) };
    }
}

/// Run the native transcription call for `audio_path`.
///
/// The returned text is copied into Rust-owned memory before the engine's
/// string is released. Both the marshalled path string and the result
/// string are freed on every exit path. A null return is
/// `InferenceFailure`; a pointer to an empty string is a successful,
/// zero-length transcript.
pub(crate) fn transcribe_file(
    vtable: &EngineVtable,
    context: &ModelContext,
    audio_path: &Path,
) -> Result<String> {
    let c_path = path_to_cstring(audio_path)?;
    // SAFETY: context is live for the duration of the borrow and c_path
    // outlives the call.
    let raw = unsafe { (vtable.transcribe)(context.raw(), c_path.as_ptr()) };
    let native =
        NativeString::from_raw(raw, vtable.free_string).ok_or(MurmurError::InferenceFailure)?;
    let text = native.to_owned_string();
    debug!(chars = text.len(), "native transcription returned");
    Ok(text)
}

fn path_to_cstring(path: &Path) -> Result<CString> {
    let utf8 = path.to_str().ok_or_else(|| {
        MurmurError::Other(anyhow!("path is not valid UTF-8: {}", path.display()))
    })?;
    CString::new(utf8).map_err(|_| {
        MurmurError::Other(anyhow!(
            "path contains an interior NUL byte: {}",
            path.display()
        ))
    })
}
