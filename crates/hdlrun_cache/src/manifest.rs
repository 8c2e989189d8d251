//! Cache manifest tracking per-file compile state.
//!
//! The manifest is stored as `manifest.json` in the cache directory. It
//! records, per source file, the content hash at the last successful compile
//! and a combined fingerprint of the file's direct dependencies at that
//! time. A backend fingerprint (toolchain name, standard revision, compile
//! flags) guards the whole manifest: compiled artifacts are backend-specific,
//! so changing any of those invalidates every entry wholesale.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use hdlrun_common::ContentHash;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Name of the manifest file within the cache directory.
const MANIFEST_FILE: &str = "manifest.json";

/// Top-level compile state cache, persisted across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileManifest {
    /// Fingerprint of the backend configuration that produced this cache.
    pub backend_fingerprint: String,

    /// Per-source-file compile state, keyed by path.
    pub files: HashMap<PathBuf, CompileEntry>,
}

/// Cached state for a single successfully compiled source file.
///
/// An entry is rewritten only after a successful compile, so a failed
/// compile leaves the entry pointing at the last good state and the file
/// remains stale on the next run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileEntry {
    /// Content hash of the source file when it was last compiled.
    pub content_hash: ContentHash,

    /// Combined hash of the file's direct dependencies, in compile order,
    /// at the time of the last compile.
    pub deps_fingerprint: ContentHash,
}

impl CompileManifest {
    /// Creates a new, empty manifest for the given backend fingerprint.
    pub fn new(backend_fingerprint: &str) -> Self {
        Self {
            backend_fingerprint: backend_fingerprint.to_string(),
            files: HashMap::new(),
        }
    }

    /// Loads the manifest from the cache directory, returning `None` if the
    /// file doesn't exist or can't be parsed.
    ///
    /// This is fail-safe: any error results in `None` (cache miss),
    /// triggering a full rebuild.
    pub fn load(cache_dir: &Path) -> Option<Self> {
        let path = cache_dir.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Loads an existing manifest or creates a fresh one.
    ///
    /// A manifest recorded under a different backend fingerprint is
    /// discarded wholesale: its entries describe artifacts the active
    /// backend cannot reuse.
    pub fn load_or_create(cache_dir: &Path, backend_fingerprint: &str) -> Self {
        Self::load(cache_dir)
            .filter(|m| m.backend_fingerprint == backend_fingerprint)
            .unwrap_or_else(|| Self::new(backend_fingerprint))
    }

    /// Saves the manifest to the cache directory.
    ///
    /// Creates the cache directory if it doesn't exist.
    pub fn save(&self, cache_dir: &Path) -> Result<(), CacheError> {
        std::fs::create_dir_all(cache_dir).map_err(|e| CacheError::Io {
            path: cache_dir.to_path_buf(),
            source: e,
        })?;
        let path = cache_dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
        std::fs::write(&path, json).map_err(|e| CacheError::Io { path, source: e })
    }

    /// Looks up the entry for a source file.
    pub fn entry(&self, path: &Path) -> Option<&CompileEntry> {
        self.files.get(path)
    }

    /// Records a successful compile of `path`.
    ///
    /// Must be called only after the backend reported success; failed
    /// compiles leave the previous entry (or absence) untouched.
    pub fn record_compiled(
        &mut self,
        path: &Path,
        content_hash: ContentHash,
        deps_fingerprint: ContentHash,
    ) {
        self.files.insert(
            path.to_path_buf(),
            CompileEntry {
                content_hash,
                deps_fingerprint,
            },
        );
    }

    /// Removes entries for files no longer part of the project.
    pub fn retain_paths(&mut self, live: &[PathBuf]) {
        self.files.retain(|path, _| live.contains(path));
    }
}

/// Builds the backend fingerprint string from the active backend settings.
///
/// Any change to the backend name, standard revision, or compile flags
/// produces a different fingerprint and therefore a wholesale cache
/// invalidation.
pub fn backend_fingerprint(backend: &str, standard: &str, flags: &[String]) -> String {
    let flags_hash = ContentHash::from_bytes(flags.join("\x1f").as_bytes());
    format!("{backend}-{standard}-{flags_hash}")
}
