//! Source files and their identifiers.

use crate::unit::{DesignUnit, UnitKind};
use hdlrun_common::ContentHash;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Index of a source file within a project, in global registration order.
///
/// Registration order is the deterministic tie-breaker for the compile
/// order, so ids are never reused or reordered.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct FileId(
    /// The zero-based global registration index.
    pub usize,
);

impl FileId {
    /// The underlying index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file#{}", self.0)
    }
}

/// The HDL dialect of a source file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// A VHDL source file.
    Vhdl,
    /// A Verilog source file.
    Verilog,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Vhdl => write!(f, "vhdl"),
            FileKind::Verilog => write!(f, "verilog"),
        }
    }
}

/// A registered source file.
///
/// Immutable once registered for a given run; the content hash is recomputed
/// at registration from the current file bytes.
#[derive(Clone, Debug)]
pub struct SourceFile {
    /// Path to the file on disk.
    pub path: PathBuf,
    /// The HDL dialect tag.
    pub kind: FileKind,
    /// Name of the owning library.
    pub library: String,
    /// Content hash of the file at registration time.
    pub content_hash: ContentHash,
    /// Design units defined by this file, in textual order.
    pub units: Vec<DesignUnit>,
}

impl SourceFile {
    /// Names of the package bodies defined in this file.
    pub fn package_bodies(&self) -> impl Iterator<Item = &DesignUnit> {
        self.units.iter().filter(|u| u.kind == UnitKind::PackageBody)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::DesignUnit;

    #[test]
    fn file_id_display() {
        assert_eq!(format!("{}", FileId(3)), "file#3");
    }

    #[test]
    fn file_kind_display() {
        assert_eq!(format!("{}", FileKind::Vhdl), "vhdl");
        assert_eq!(format!("{}", FileKind::Verilog), "verilog");
    }

    #[test]
    fn file_kind_serde() {
        let kind: FileKind = serde_json::from_str("\"vhdl\"").unwrap();
        assert_eq!(kind, FileKind::Vhdl);
    }

    #[test]
    fn package_bodies_filtered() {
        let file = SourceFile {
            path: PathBuf::from("src/pkg.vhd"),
            kind: FileKind::Vhdl,
            library: "lib".to_string(),
            content_hash: ContentHash::from_bytes(b"pkg"),
            units: vec![
                DesignUnit::new("p", UnitKind::Package),
                DesignUnit::new("p", UnitKind::PackageBody),
                DesignUnit::new("e", UnitKind::Entity),
            ],
        };
        let bodies: Vec<&str> = file.package_bodies().map(|u| u.name.as_str()).collect();
        assert_eq!(bodies, vec!["p"]);
    }
}
