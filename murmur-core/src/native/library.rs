//! Locating and loading the native engine library.

use std::path::{Path, PathBuf};

use libloading::Library;
use tracing::{debug, info, warn};

use super::{EngineVtable, FreeContextFn, FreeStringFn, InitFn, TranscribeFn};
use crate::error::{LibraryAttempt, MurmurError, Result};

pub(crate) const INIT_SYMBOL: &str = "whisper_ffi_init";
pub(crate) const TRANSCRIBE_SYMBOL: &str = "whisper_ffi_transcribe";
pub(crate) const FREE_CONTEXT_SYMBOL: &str = "whisper_ffi_free";
pub(crate) const FREE_STRING_SYMBOL: &str = "whisper_ffi_free_string";

/// A successfully loaded engine module and its resolved entry points.
///
/// Dropping this unloads the module, so the vtable is only handed out as a
/// borrow that cannot outlive it.
#[derive(Debug)]
pub struct LoadedLibrary {
    vtable: EngineVtable,
    path: PathBuf,
    _lib: Library,
}

impl LoadedLibrary {
    /// Try each candidate in order; the first that loads wins.
    ///
    /// # Errors
    /// - `LibraryNotFound` with every attempted candidate and its loader
    ///   error when none load.
    /// - `SymbolResolutionFailure` when a candidate loads but lacks one of
    ///   the required exports. A partially compatible build is a
    ///   configuration problem; trying further candidates would mask it.
    pub fn resolve(candidates: &[PathBuf]) -> Result<Self> {
        let mut attempts = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            debug!(path = %candidate.display(), "trying native library candidate");
            match unsafe { Library::new(candidate) } {
                Ok(lib) => {
                    let vtable = resolve_symbols(&lib, candidate)?;
                    info!(path = %candidate.display(), "native library loaded");
                    return Ok(Self {
                        vtable,
                        path: candidate.clone(),
                        _lib: lib,
                    });
                }
                Err(e) => {
                    attempts.push(LibraryAttempt {
                        path: candidate.clone(),
                        cause: e.to_string(),
                    });
                }
            }
        }
        warn!(
            candidates = attempts.len(),
            "no native library candidate could be loaded"
        );
        Err(MurmurError::LibraryNotFound { attempts })
    }

    /// The candidate that was actually loaded.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn vtable(&self) -> &EngineVtable {
        &self.vtable
    }
}

fn resolve_symbols(lib: &Library, path: &Path) -> Result<EngineVtable> {
    Ok(EngineVtable {
        init: *lookup::<InitFn>(lib, path, INIT_SYMBOL)?,
        transcribe: *lookup::<TranscribeFn>(lib, path, TRANSCRIBE_SYMBOL)?,
        free_context: *lookup::<FreeContextFn>(lib, path, FREE_CONTEXT_SYMBOL)?,
        free_string: *lookup::<FreeStringFn>(lib, path, FREE_STRING_SYMBOL)?,
    })
}

fn lookup<'lib, T>(
    lib: &'lib Library,
    path: &Path,
    symbol: &str,
) -> Result<libloading::Symbol<'lib, T>> {
    unsafe { lib.get(symbol.as_bytes()) }.map_err(|_| MurmurError::SymbolResolutionFailure {
        symbol: symbol.to_string(),
        path: path.to_path_buf(),
    })
}

/// Platform-appropriate places to look for the engine library, in priority
/// order: next to the executable first, then the system loader search path.
pub fn default_candidates() -> Vec<PathBuf> {
    let name = platform_library_name();
    let mut candidates = Vec::new();
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            candidates.push(dir.join(name));
        }
    }
    candidates.push(PathBuf::from(name));
    candidates
}

fn platform_library_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "whisper_ffi.dll"
    } else if cfg!(target_os = "macos") {
        "libwhisper_ffi.dylib"
    } else {
        "libwhisper_ffi.so"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_candidates_fall_back_to_the_loader_search_path() {
        let candidates = default_candidates();
        assert!(!candidates.is_empty());

        // Last candidate is the bare library name, resolved by the loader.
        let last = candidates.last().expect("at least one candidate");
        assert_eq!(last.as_os_str(), platform_library_name());
    }

    #[test]
    fn resolving_no_candidates_is_library_not_found() {
        let err = LoadedLibrary::resolve(&[]).expect_err("no candidates to resolve");
        assert!(matches!(
            err,
            MurmurError::LibraryNotFound { attempts } if attempts.is_empty()
        ));
    }
}
