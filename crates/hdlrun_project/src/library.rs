//! Named libraries grouping source files and their compiled artifacts.

use crate::source_file::FileId;
use std::path::{Path, PathBuf};

/// A named compilation namespace.
///
/// A library owns an on-disk artifact directory where the backend places its
/// compiled output. The directory is created lazily, just before the first
/// compile targeting it, so a resolve-only invocation leaves no droppings.
#[derive(Clone, Debug)]
pub struct Library {
    /// The unique library name.
    pub name: String,
    /// The artifact directory for compiled output.
    pub directory: PathBuf,
    /// Files registered into this library, in registration order.
    pub files: Vec<FileId>,
}

impl Library {
    /// Creates a new, empty library.
    pub fn new(name: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            files: Vec::new(),
        }
    }

    /// Creates the artifact directory if it does not yet exist.
    pub fn ensure_directory(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.directory)
    }

    /// The artifact directory as a path.
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}
