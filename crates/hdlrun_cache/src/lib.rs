//! Persisted compile state cache for incremental builds.
//!
//! The cache records, for every source file, the content hash at the time of
//! its last successful compile and a fingerprint of its direct dependencies'
//! hashes. The staleness resolver compares the current project state against
//! these entries to find the minimal set of files needing recompilation.
//!
//! All reads are fail-safe: corruption, version skew, or a backend
//! fingerprint mismatch yield a fresh cache (full rebuild) rather than an
//! error.

#![warn(missing_docs)]

pub mod error;
pub mod manifest;

pub use error::CacheError;
pub use manifest::{backend_fingerprint, CompileEntry, CompileManifest};
