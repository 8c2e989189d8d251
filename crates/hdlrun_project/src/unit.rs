//! Design units and cross-unit references.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a VHDL design unit.
///
/// Primary units (entity, package, configuration) are unique per library and
/// are the targets of cross-file references. Secondary units (architecture,
/// package body) belong to a primary unit and are not referenced directly,
/// except through the package-body backend quirk.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// An entity declaration.
    Entity,
    /// An architecture body of an entity.
    Architecture,
    /// A package declaration.
    Package,
    /// A package body.
    PackageBody,
    /// A configuration declaration.
    Configuration,
}

impl UnitKind {
    /// Returns `true` for primary units (reference targets).
    pub fn is_primary(self) -> bool {
        matches!(
            self,
            UnitKind::Entity | UnitKind::Package | UnitKind::Configuration
        )
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitKind::Entity => write!(f, "entity"),
            UnitKind::Architecture => write!(f, "architecture"),
            UnitKind::Package => write!(f, "package"),
            UnitKind::PackageBody => write!(f, "package body"),
            UnitKind::Configuration => write!(f, "configuration"),
        }
    }
}

/// A reference from one design unit to another, as (library, unit) names.
///
/// The library name `work` refers to the owning library of the referencing
/// file and is resolved during reference resolution. VHDL names are case
/// insensitive; comparisons are performed on lowercased names.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct UnitRef {
    /// The referenced library name.
    pub library: String,
    /// The referenced unit name.
    pub unit: String,
}

impl UnitRef {
    /// Creates a new reference.
    pub fn new(library: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            library: library.into(),
            unit: unit.into(),
        }
    }
}

impl fmt::Display for UnitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.library, self.unit)
    }
}

/// A named constituent of a source file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DesignUnit {
    /// The unit name.
    pub name: String,
    /// The unit kind.
    pub kind: UnitKind,
    /// Units this unit references, as (library, unit) pairs.
    #[serde(default)]
    pub references: Vec<UnitRef>,
}

impl DesignUnit {
    /// Creates a design unit with no references.
    pub fn new(name: impl Into<String>, kind: UnitKind) -> Self {
        Self {
            name: name.into(),
            kind,
            references: Vec::new(),
        }
    }

    /// Adds a reference to this unit.
    pub fn with_reference(mut self, library: impl Into<String>, unit: impl Into<String>) -> Self {
        self.references.push(UnitRef::new(library, unit));
        self
    }
}
