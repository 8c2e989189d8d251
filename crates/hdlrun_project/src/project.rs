//! Project registration and reference resolution.

use std::collections::HashMap;
use std::path::PathBuf;

use hdlrun_cache::CompileManifest;
use hdlrun_common::ContentHash;

use crate::error::{ProjectError, UnresolvedRef};
use crate::graph::{DependencyGraph, EdgeKind};
use crate::library::Library;
use crate::source_file::{FileId, FileKind, SourceFile};
use crate::stale::{self, PlanEntry};
use crate::unit::{DesignUnit, UnitKind};

/// Resolution knobs derived from the active backend's capabilities.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResolveOptions {
    /// When set, any file referencing a package specification also gets a
    /// dependency edge on the file defining that package's body.
    ///
    /// The edge is added for direct referencers only: elaboration binds
    /// bodies only for units that name the package, and indirect consumers
    /// are already ordered after the body through the direct referencer.
    pub package_bodies_required: bool,
}

/// A project under construction: libraries and their registered files.
///
/// Registration is closed by calling [`resolve`](Self::resolve), which
/// checks every cross-unit reference over the whole registered set and
/// derives the dependency graph and compile order.
#[derive(Default, Debug)]
pub struct Project {
    libraries: Vec<Library>,
    lib_index: HashMap<String, usize>,
    files: Vec<SourceFile>,
}

impl Project {
    /// Creates an empty project.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a library.
    ///
    /// Library names are case insensitive (VHDL identifiers); the original
    /// spelling is kept for display and artifact paths. The artifact
    /// directory is not created here; it is created lazily before the
    /// first compile into the library.
    pub fn add_library(
        &mut self,
        name: impl Into<String>,
        directory: impl Into<PathBuf>,
    ) -> Result<(), ProjectError> {
        let name = name.into();
        let key = name.to_ascii_lowercase();
        if self.lib_index.contains_key(&key) {
            return Err(ProjectError::DuplicateLibrary(name));
        }
        self.lib_index.insert(key, self.libraries.len());
        self.libraries.push(Library::new(name, directory));
        Ok(())
    }

    /// Registers a source file into a library with its scanned units.
    ///
    /// The content hash is recomputed by the caller at scan time from the
    /// current file bytes. Files keep their global registration order,
    /// which the compile order uses to break ties.
    pub fn add_source_file(
        &mut self,
        library: &str,
        path: impl Into<PathBuf>,
        kind: FileKind,
        content_hash: ContentHash,
        units: Vec<DesignUnit>,
    ) -> Result<FileId, ProjectError> {
        let lib_idx = *self
            .lib_index
            .get(&library.to_ascii_lowercase())
            .ok_or_else(|| ProjectError::UnknownLibrary(library.to_string()))?;

        let id = FileId(self.files.len());
        self.files.push(SourceFile {
            path: path.into(),
            kind,
            library: self.libraries[lib_idx].name.clone(),
            content_hash,
            units,
        });
        self.libraries[lib_idx].files.push(id);
        Ok(id)
    }

    /// The registered libraries, in registration order.
    pub fn libraries(&self) -> &[Library] {
        &self.libraries
    }

    /// Looks up a library by case-insensitive name.
    pub fn library(&self, name: &str) -> Option<&Library> {
        self.lib_index
            .get(&name.to_ascii_lowercase())
            .map(|&i| &self.libraries[i])
    }

    /// The registered files, in registration order.
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// The file with the given id.
    pub fn file(&self, id: FileId) -> &SourceFile {
        &self.files[id.index()]
    }

    /// Closes registration: resolves every reference, builds the dependency
    /// graph, and computes the compile order.
    ///
    /// Missing definitions are collected over the *entire* registered set
    /// before failing, so the error names the same identifiers regardless
    /// of the order files were registered in. References to libraries not
    /// registered in this project (e.g. `ieee`, `std`) are external: the
    /// simulator ships them precompiled, so they impose no ordering here.
    pub fn resolve(&self, options: ResolveOptions) -> Result<ResolvedDesign<'_>, ProjectError> {
        let (primaries, bodies) = self.unit_definitions()?;

        let mut graph = DependencyGraph::new(self.files.len());
        let mut unresolved = Vec::new();

        for (idx, file) in self.files.iter().enumerate() {
            let from = FileId(idx);
            for unit in &file.units {
                for r in &unit.references {
                    let lib_name = if r.library.eq_ignore_ascii_case("work") {
                        file.library.clone()
                    } else {
                        r.library.clone()
                    };
                    if self.library(&lib_name).is_none() {
                        // External library (ieee, std, vendor): precompiled,
                        // no ordering constraint.
                        continue;
                    }
                    let key = (
                        lib_name.to_ascii_lowercase(),
                        r.unit.to_ascii_lowercase(),
                    );
                    match primaries.get(&key) {
                        Some(&(target, target_kind)) => {
                            graph.add_edge(from, target, EdgeKind::Reference);
                            if target_kind == UnitKind::Package && options.package_bodies_required {
                                if let Some(&body) = bodies.get(&key) {
                                    graph.add_edge(from, body, EdgeKind::PackageBody);
                                }
                            }
                        }
                        None => {
                            let entry = UnresolvedRef {
                                library: lib_name,
                                unit: r.unit.clone(),
                                referenced_from: file.path.clone(),
                            };
                            if !unresolved.contains(&entry) {
                                unresolved.push(entry);
                            }
                        }
                    }
                }
            }
        }

        if !unresolved.is_empty() {
            return Err(ProjectError::UnresolvedReferences(unresolved));
        }

        let order = graph.compile_order().map_err(|cycle| {
            ProjectError::DependencyCycle {
                files: cycle.iter().map(|&f| self.file(f).path.clone()).collect(),
            }
        })?;

        let mut order_pos = vec![0usize; self.files.len()];
        for (pos, &file) in order.iter().enumerate() {
            order_pos[file.index()] = pos;
        }

        Ok(ResolvedDesign {
            project: self,
            graph,
            order,
            order_pos,
        })
    }

    /// Builds the definition maps for primary units and package bodies,
    /// keyed by lowercased (library, unit) pairs.
    #[allow(clippy::type_complexity)]
    fn unit_definitions(
        &self,
    ) -> Result<
        (
            HashMap<(String, String), (FileId, UnitKind)>,
            HashMap<(String, String), FileId>,
        ),
        ProjectError,
    > {
        let mut primaries: HashMap<(String, String), (FileId, UnitKind)> = HashMap::new();
        let mut bodies: HashMap<(String, String), FileId> = HashMap::new();

        for (idx, file) in self.files.iter().enumerate() {
            let id = FileId(idx);
            let lib_key = file.library.to_ascii_lowercase();
            for unit in &file.units {
                let key = (lib_key.clone(), unit.name.to_ascii_lowercase());
                if unit.kind.is_primary() {
                    if let Some(&(first, _)) = primaries.get(&key) {
                        return Err(ProjectError::DuplicateUnit {
                            kind: unit.kind.to_string(),
                            library: file.library.clone(),
                            unit: unit.name.clone(),
                            first: self.file(first).path.clone(),
                            second: file.path.clone(),
                        });
                    }
                    primaries.insert(key, (id, unit.kind));
                } else if unit.kind == UnitKind::PackageBody {
                    if let Some(&first) = bodies.get(&key) {
                        return Err(ProjectError::DuplicateUnit {
                            kind: unit.kind.to_string(),
                            library: file.library.clone(),
                            unit: unit.name.clone(),
                            first: self.file(first).path.clone(),
                            second: file.path.clone(),
                        });
                    }
                    bodies.insert(key, id);
                }
                // Architectures share names across entities and are never
                // reference targets; they don't enter the maps.
            }
        }

        Ok((primaries, bodies))
    }
}

/// A project whose registration has been closed and references resolved.
///
/// Holds the dependency graph and the total compile order, and answers the
/// staleness and closure queries the scheduler and orchestrator need.
#[derive(Debug)]
pub struct ResolvedDesign<'p> {
    project: &'p Project,
    graph: DependencyGraph,
    order: Vec<FileId>,
    order_pos: Vec<usize>,
}

impl<'p> ResolvedDesign<'p> {
    /// The project this design was resolved from.
    pub fn project(&self) -> &'p Project {
        self.project
    }

    /// The dependency graph.
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// The full compile order (dependencies before dependents).
    pub fn compile_order(&self) -> &[FileId] {
        &self.order
    }

    /// The position of `file` in the compile order.
    pub fn order_position(&self, file: FileId) -> usize {
        self.order_pos[file.index()]
    }

    /// Fingerprint of `file`'s direct dependencies: their current content
    /// hashes combined in compile order.
    pub fn deps_fingerprint(&self, file: FileId) -> ContentHash {
        let mut deps = self.graph.direct_deps(file);
        deps.sort_by_key(|&d| self.order_pos[d.index()]);
        let hashes: Vec<&ContentHash> = deps
            .iter()
            .map(|&d| &self.project.file(d).content_hash)
            .collect();
        ContentHash::combine(hashes.into_iter())
    }

    /// Computes, for every file in compile order, whether it needs
    /// recompilation given the persisted cache state.
    pub fn stale_files(&self, manifest: &CompileManifest) -> Vec<PlanEntry> {
        stale::plan(self, manifest)
    }

    /// Records a successful compile of `file` in the cache.
    ///
    /// Stores the file's current content hash and dependency fingerprint.
    /// Callers must invoke this only after the backend reported success, so
    /// a failed compile leaves the cache pointing at the last good state.
    pub fn mark_compiled(&self, manifest: &mut CompileManifest, file: FileId) {
        let f = self.project.file(file);
        manifest.record_compiled(&f.path, f.content_hash, self.deps_fingerprint(file));
    }

    /// The dependency closure of a library: every file of the library plus
    /// everything those files transitively depend on.
    pub fn library_closure(&self, library: &str) -> Vec<FileId> {
        match self.project.library(library) {
            Some(lib) => self.graph.closure(&lib.files),
            None => Vec::new(),
        }
    }
}
