//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur while persisting the compile state cache.
///
/// Reads are fail-safe and never produce these errors (a bad cache is a
/// cache miss); only `save` reports failures, since losing the cache write
/// silently would force needless rebuilds on the next run.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while writing cache files.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A serialization error occurred.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}
