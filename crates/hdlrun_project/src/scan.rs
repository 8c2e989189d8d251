//! Scanner collaborator interface.
//!
//! The textual HDL parser lives outside this workspace. It emits, per source
//! file, the design units defined in the file and the (library, unit) pairs
//! they reference, serialized as JSON. This module defines that wire format
//! and the loader; content hashes are recomputed here at registration time
//! from the current file bytes rather than trusted from the scan.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ProjectError;
use crate::source_file::FileKind;
use crate::unit::DesignUnit;

/// The scanner's output for an entire project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOutput {
    /// Scanned files in scan order.
    pub files: Vec<ScannedFile>,
}

/// The scanner's output for a single source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannedFile {
    /// Path to the source file.
    pub path: PathBuf,
    /// The library the file belongs to.
    pub library: String,
    /// The HDL dialect tag.
    pub kind: FileKind,
    /// Design units defined in the file, in textual order.
    #[serde(default)]
    pub units: Vec<DesignUnit>,
}

impl ScanOutput {
    /// Loads scanner output from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ProjectError> {
        let content = std::fs::read_to_string(path).map_err(|e| ProjectError::ScanIo {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    /// Parses scanner output from a JSON string.
    pub fn from_json(content: &str) -> Result<Self, ProjectError> {
        serde_json::from_str(content).map_err(|e| ProjectError::ScanParse {
            reason: e.to_string(),
        })
    }
}
