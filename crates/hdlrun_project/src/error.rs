//! Error types for project construction and resolution.
//!
//! Everything here is a configuration error in the run taxonomy: fatal,
//! reported before any compilation starts.

use std::fmt;
use std::path::PathBuf;

/// A reference that resolution could not match to any defining unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedRef {
    /// The referenced library name (after `work` resolution).
    pub library: String,
    /// The referenced unit name.
    pub unit: String,
    /// The file containing the reference.
    pub referenced_from: PathBuf,
}

impl fmt::Display for UnresolvedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} (referenced from {})",
            self.library,
            self.unit,
            self.referenced_from.display()
        )
    }
}

/// Errors raised while registering files or resolving the dependency graph.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// A library with the same name was already registered.
    #[error("library '{0}' is already registered")]
    DuplicateLibrary(String),

    /// A file was registered into a library that does not exist.
    #[error("unknown library '{0}'")]
    UnknownLibrary(String),

    /// Two files define the same primary unit in the same library.
    #[error(
        "duplicate {kind} '{library}.{unit}': defined in {first} and {second}"
    )]
    DuplicateUnit {
        /// The unit kind as display text.
        kind: String,
        /// The owning library.
        library: String,
        /// The unit name.
        unit: String,
        /// The file holding the first definition.
        first: PathBuf,
        /// The file holding the conflicting definition.
        second: PathBuf,
    },

    /// One or more references had no defining unit anywhere in the
    /// registered set.
    ///
    /// Collected over the entire project so the report is identical
    /// regardless of registration order.
    #[error("unresolved references: {}", format_refs(.0))]
    UnresolvedReferences(Vec<UnresolvedRef>),

    /// The dependency graph contains a cycle.
    ///
    /// Names every participating file; no compile order exists.
    #[error("dependency cycle between: {}", format_paths(.files))]
    DependencyCycle {
        /// The files participating in the cycle, in cycle order.
        files: Vec<PathBuf>,
    },

    /// The scanner output file could not be read.
    #[error("failed to read scan output {path}: {source}")]
    ScanIo {
        /// The scan file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The scanner output was not valid JSON of the expected shape.
    #[error("failed to parse scan output: {reason}")]
    ScanParse {
        /// Description of the parse failure.
        reason: String,
    },
}

fn format_refs(refs: &[UnresolvedRef]) -> String {
    refs.iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_duplicate_library() {
        let err = ProjectError::DuplicateLibrary("uart_lib".to_string());
        assert_eq!(format!("{err}"), "library 'uart_lib' is already registered");
    }

    #[test]
    fn display_unresolved() {
        let err = ProjectError::UnresolvedReferences(vec![
            UnresolvedRef {
                library: "uart_lib".to_string(),
                unit: "missing_pkg".to_string(),
                referenced_from: PathBuf::from("src/top.vhd"),
            },
            UnresolvedRef {
                library: "other".to_string(),
                unit: "gone".to_string(),
                referenced_from: PathBuf::from("src/tb.vhd"),
            },
        ]);
        let msg = format!("{err}");
        assert!(msg.contains("uart_lib.missing_pkg"));
        assert!(msg.contains("src/top.vhd"));
        assert!(msg.contains("other.gone"));
    }

    #[test]
    fn display_cycle_names_participants() {
        let err = ProjectError::DependencyCycle {
            files: vec![
                PathBuf::from("a.vhd"),
                PathBuf::from("b.vhd"),
                PathBuf::from("a.vhd"),
            ],
        };
        let msg = format!("{err}");
        assert!(msg.contains("a.vhd -> b.vhd -> a.vhd"));
    }

    #[test]
    fn display_duplicate_unit() {
        let err = ProjectError::DuplicateUnit {
            kind: "package".to_string(),
            library: "uart_lib".to_string(),
            unit: "uart_pkg".to_string(),
            first: PathBuf::from("src/pkg1.vhd"),
            second: PathBuf::from("src/pkg2.vhd"),
        };
        let msg = format!("{err}");
        assert!(msg.contains("uart_lib.uart_pkg"));
        assert!(msg.contains("pkg1.vhd"));
        assert!(msg.contains("pkg2.vhd"));
    }
}
