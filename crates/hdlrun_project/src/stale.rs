//! Staleness resolution against the persisted compile state cache.
//!
//! Given the resolved compile order and the cache manifest, computes the
//! minimal ordered subset of files requiring recompilation. The pass never
//! reorders anything: it walks the total order once and only decides, per
//! file, whether it is acted upon.

use hdlrun_cache::CompileManifest;

use crate::project::ResolvedDesign;
use crate::source_file::FileId;

/// One file's slot in the compile plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanEntry {
    /// The file, in full compile order.
    pub file: FileId,
    /// Whether this file must be recompiled.
    pub needs_compile: bool,
}

/// Computes the per-file staleness flags in full compile order.
///
/// A file is stale iff:
/// - the cache has no entry for it, or
/// - its current content hash differs from the cached hash, or
/// - its current dependency fingerprint differs from the cached one, or
/// - any of its direct dependencies is itself stale.
///
/// The single forward pass is sound because the compile order guarantees
/// every dependency is decided before its dependents, so staleness
/// propagates transitively through the chain of direct-dependency checks.
pub fn plan(design: &ResolvedDesign<'_>, manifest: &CompileManifest) -> Vec<PlanEntry> {
    let project = design.project();
    let mut stale = vec![false; project.files().len()];
    let mut entries = Vec::with_capacity(project.files().len());

    for &file in design.compile_order() {
        let source = project.file(file);
        let needs_compile = match manifest.entry(&source.path) {
            None => true,
            Some(entry) => {
                entry.content_hash != source.content_hash
                    || entry.deps_fingerprint != design.deps_fingerprint(file)
                    || design
                        .graph()
                        .direct_deps(file)
                        .iter()
                        .any(|d| stale[d.index()])
            }
        };
        stale[file.index()] = needs_compile;
        entries.push(PlanEntry {
            file,
            needs_compile,
        });
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{Project, ResolveOptions};
    use crate::source_file::FileKind;
    use crate::unit::{DesignUnit, UnitKind};
    use hdlrun_common::ContentHash;

    fn hash(s: &str) -> ContentHash {
        ContentHash::from_bytes(s.as_bytes())
    }

    /// A three-file chain: top.vhd -> mid.vhd -> base.vhd, plus an
    /// independent other.vhd.
    fn chain_project(base_content: &str) -> Project {
        let mut project = Project::new();
        project.add_library("l", "out/l").unwrap();
        project
            .add_source_file(
                "l",
                "base.vhd",
                FileKind::Vhdl,
                hash(base_content),
                vec![DesignUnit::new("base_pkg", UnitKind::Package)],
            )
            .unwrap();
        project
            .add_source_file(
                "l",
                "mid.vhd",
                FileKind::Vhdl,
                hash("mid"),
                vec![DesignUnit::new("mid_pkg", UnitKind::Package)
                    .with_reference("l", "base_pkg")],
            )
            .unwrap();
        project
            .add_source_file(
                "l",
                "top.vhd",
                FileKind::Vhdl,
                hash("top"),
                vec![DesignUnit::new("top", UnitKind::Entity).with_reference("l", "mid_pkg")],
            )
            .unwrap();
        project
            .add_source_file(
                "l",
                "other.vhd",
                FileKind::Vhdl,
                hash("other"),
                vec![DesignUnit::new("other", UnitKind::Entity)],
            )
            .unwrap();
        project
    }

    fn compile_everything(design: &crate::project::ResolvedDesign<'_>, manifest: &mut CompileManifest) {
        for entry in design.stale_files(manifest) {
            if entry.needs_compile {
                design.mark_compiled(manifest, entry.file);
            }
        }
    }

    #[test]
    fn empty_cache_everything_stale() {
        let project = chain_project("base");
        let design = project.resolve(ResolveOptions::default()).unwrap();
        let manifest = CompileManifest::new("fp");

        let entries = plan(&design, &manifest);
        assert_eq!(entries.len(), 4);
        assert!(entries.iter().all(|e| e.needs_compile));
    }

    #[test]
    fn second_run_is_idempotent() {
        let project = chain_project("base");
        let design = project.resolve(ResolveOptions::default()).unwrap();
        let mut manifest = CompileManifest::new("fp");

        compile_everything(&design, &mut manifest);

        let entries = plan(&design, &manifest);
        assert!(
            entries.iter().all(|e| !e.needs_compile),
            "no file should be stale after a clean run"
        );
    }

    #[test]
    fn change_propagates_transitively() {
        // Build, compile, then rebuild the project with changed base content.
        let project = chain_project("base v1");
        let design = project.resolve(ResolveOptions::default()).unwrap();
        let mut manifest = CompileManifest::new("fp");
        compile_everything(&design, &mut manifest);

        let changed = chain_project("base v2");
        let design2 = changed.resolve(ResolveOptions::default()).unwrap();
        let entries = plan(&design2, &manifest);

        let stale_paths: Vec<String> = entries
            .iter()
            .filter(|e| e.needs_compile)
            .map(|e| design2.project().file(e.file).path.display().to_string())
            .collect();

        assert_eq!(stale_paths, vec!["base.vhd", "mid.vhd", "top.vhd"]);
        // The independent file stays fresh.
        assert!(!stale_paths.contains(&"other.vhd".to_string()));
    }

    #[test]
    fn leaf_change_does_not_propagate_upstream() {
        let project = chain_project("base");
        let design = project.resolve(ResolveOptions::default()).unwrap();
        let mut manifest = CompileManifest::new("fp");
        compile_everything(&design, &mut manifest);

        // Rebuild with top.vhd changed only.
        let mut changed = Project::new();
        changed.add_library("l", "out/l").unwrap();
        changed
            .add_source_file(
                "l",
                "base.vhd",
                FileKind::Vhdl,
                hash("base"),
                vec![DesignUnit::new("base_pkg", UnitKind::Package)],
            )
            .unwrap();
        changed
            .add_source_file(
                "l",
                "mid.vhd",
                FileKind::Vhdl,
                hash("mid"),
                vec![DesignUnit::new("mid_pkg", UnitKind::Package)
                    .with_reference("l", "base_pkg")],
            )
            .unwrap();
        changed
            .add_source_file(
                "l",
                "top.vhd",
                FileKind::Vhdl,
                hash("top CHANGED"),
                vec![DesignUnit::new("top", UnitKind::Entity).with_reference("l", "mid_pkg")],
            )
            .unwrap();
        changed
            .add_source_file(
                "l",
                "other.vhd",
                FileKind::Vhdl,
                hash("other"),
                vec![DesignUnit::new("other", UnitKind::Entity)],
            )
            .unwrap();

        let design2 = changed.resolve(ResolveOptions::default()).unwrap();
        let entries = plan(&design2, &manifest);
        let stale: Vec<String> = entries
            .iter()
            .filter(|e| e.needs_compile)
            .map(|e| design2.project().file(e.file).path.display().to_string())
            .collect();
        assert_eq!(stale, vec!["top.vhd"]);
    }

    #[test]
    fn failed_compile_stays_stale() {
        let project = chain_project("base");
        let design = project.resolve(ResolveOptions::default()).unwrap();
        let mut manifest = CompileManifest::new("fp");

        // Compile everything except mid.vhd (simulated failure: no cache
        // update for it).
        for entry in design.stale_files(&manifest) {
            let path = design.project().file(entry.file).path.clone();
            if path.to_str() != Some("mid.vhd") {
                design.mark_compiled(&mut manifest, entry.file);
            }
        }

        let entries = plan(&design, &manifest);
        let stale: Vec<String> = entries
            .iter()
            .filter(|e| e.needs_compile)
            .map(|e| design.project().file(e.file).path.display().to_string())
            .collect();
        // mid failed, so mid and its dependent top must recompile; base and
        // other are fine.
        assert_eq!(stale, vec!["mid.vhd", "top.vhd"]);
    }

    #[test]
    fn plan_preserves_compile_order() {
        let project = chain_project("base");
        let design = project.resolve(ResolveOptions::default()).unwrap();
        let manifest = CompileManifest::new("fp");

        let entries = plan(&design, &manifest);
        let plan_order: Vec<FileId> = entries.iter().map(|e| e.file).collect();
        assert_eq!(plan_order, design.compile_order());
    }

    #[test]
    fn interrupted_run_recovers_via_deps_fingerprint() {
        // First run: compile everything.
        let project = chain_project("base v1");
        let design = project.resolve(ResolveOptions::default()).unwrap();
        let mut manifest = CompileManifest::new("fp");
        compile_everything(&design, &mut manifest);

        // base changes; the new run compiles base successfully but is
        // interrupted before mid/top (their entries keep the old state).
        let changed = chain_project("base v2");
        let design2 = changed.resolve(ResolveOptions::default()).unwrap();
        design2.mark_compiled(&mut manifest, FileId(0));

        // Next run: base is up to date, but mid's recorded dependency
        // fingerprint no longer matches, so mid and top still recompile.
        let entries = plan(&design2, &manifest);
        let stale: Vec<String> = entries
            .iter()
            .filter(|e| e.needs_compile)
            .map(|e| design2.project().file(e.file).path.display().to_string())
            .collect();
        assert_eq!(stale, vec!["mid.vhd", "top.vhd"]);
    }
}
