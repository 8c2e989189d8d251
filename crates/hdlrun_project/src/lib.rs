//! Project model and dependency-aware compile scheduling for hdlrun.
//!
//! A project is a set of named libraries, each holding source files in
//! registration order. Each file defines design units (entities,
//! architectures, packages, package bodies, configurations) that may
//! reference units in other files. From those references this crate derives
//! a file-level dependency graph, computes a deterministic compile order
//! over it, and resolves the minimal stale subset needing recompilation
//! against the persisted compile state cache.

#![warn(missing_docs)]

pub mod error;
pub mod graph;
pub mod library;
pub mod project;
pub mod scan;
pub mod source_file;
pub mod stale;
pub mod unit;

pub use error::{ProjectError, UnresolvedRef};
pub use graph::{DependencyGraph, EdgeKind};
pub use library::Library;
pub use project::{Project, ResolveOptions, ResolvedDesign};
pub use scan::{ScanOutput, ScannedFile};
pub use source_file::{FileId, FileKind, SourceFile};
pub use stale::PlanEntry;
pub use unit::{DesignUnit, UnitKind, UnitRef};
