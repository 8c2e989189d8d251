//! Shared plumbing for the CLI commands.
//!
//! Loads the configuration and the scanner's output, registers libraries
//! and files into a [`Project`], and sets up the backend adapter.

use std::collections::HashMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hdlrun_common::ContentHash;
use hdlrun_config::{load_config, load_config_from_str, ProjectConfig};
use hdlrun_project::{FileKind, Project, ScanOutput};
use hdlrun_run::TestConfiguration;
use hdlrun_sim::{create_simulator, LibraryMapping, SimError, Simulator};

use crate::GlobalArgs;

/// Locates the project root and loads its configuration.
///
/// With `--config` the given file is loaded and its directory becomes the
/// root; otherwise `hdlrun.toml` is looked up in the current directory.
pub fn load_project_config(global: &GlobalArgs) -> Result<(PathBuf, ProjectConfig), Box<dyn Error>> {
    match &global.config {
        Some(path) => {
            let path = PathBuf::from(path);
            let content = std::fs::read_to_string(&path)?;
            let config = load_config_from_str(&content)?;
            let root = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."))
                .to_path_buf();
            Ok((root, config))
        }
        None => {
            let root = std::env::current_dir()?;
            let config = load_config(&root)?;
            Ok((root, config))
        }
    }
}

/// The scan file path for a run: `--scan` override or `scan.json` in the
/// project root.
pub fn scan_path(root: &Path, over: Option<&str>) -> PathBuf {
    match over {
        Some(p) => {
            let p = PathBuf::from(p);
            if p.is_absolute() {
                p
            } else {
                root.join(p)
            }
        }
        None => root.join("scan.json"),
    }
}

/// The directory holding compiled library artifacts.
pub fn libraries_dir(root: &Path, config: &ProjectConfig) -> PathBuf {
    root.join(&config.build.output_dir).join("libraries")
}

/// Registers all configured libraries and files into a fresh project.
///
/// The configuration is authoritative for library membership and
/// registration order; the scan output is authoritative for the units a
/// file defines. Content hashes are recomputed here from the current file
/// bytes. A file the scanner did not cover registers with no units.
pub fn build_project(
    config: &ProjectConfig,
    root: &Path,
    scan: &ScanOutput,
) -> Result<Project, Box<dyn Error>> {
    let mut project = Project::new();
    let lib_root = libraries_dir(root, config);

    let scanned: HashMap<&Path, &hdlrun_project::ScannedFile> = scan
        .files
        .iter()
        .map(|f| (f.path.as_path(), f))
        .collect();

    for (name, lib) in &config.libraries {
        project.add_library(name, lib_root.join(name))?;
        for file in &lib.files {
            let rel = Path::new(file);
            let on_disk = root.join(rel);
            let bytes = std::fs::read(&on_disk)
                .map_err(|e| format!("cannot read source file {}: {e}", on_disk.display()))?;
            let hash = ContentHash::from_bytes(&bytes);

            let (kind, units) = match scanned.get(rel) {
                Some(s) => (s.kind, s.units.clone()),
                None => (kind_from_extension(rel), Vec::new()),
            };
            project.add_source_file(name, on_disk, kind, hash, units)?;
        }
    }

    Ok(project)
}

/// Infers the HDL dialect from a file extension when the scan has no entry.
fn kind_from_extension(path: &Path) -> FileKind {
    match path.extension().and_then(|e| e.to_str()) {
        Some("v") | Some("sv") => FileKind::Verilog,
        _ => FileKind::Vhdl,
    }
}

/// The resolved library map passed into every adapter operation.
pub fn library_mappings(project: &Project) -> Vec<LibraryMapping> {
    project
        .libraries()
        .iter()
        .map(|l| LibraryMapping::new(l.name.clone(), l.directory.clone()))
        .collect()
}

/// Converts the configuration's `[[test]]` declarations into run
/// configurations, applying name/filter selection and the global timeout.
pub fn test_configurations(
    config: &ProjectConfig,
    name: Option<&str>,
    filter: Option<&str>,
    timeout: Option<Duration>,
) -> Vec<TestConfiguration> {
    config
        .tests
        .iter()
        .filter(|t| {
            let display = t.display_name();
            if let Some(n) = name {
                return display == n;
            }
            if let Some(f) = filter {
                return display.contains(f);
            }
            true
        })
        .map(|t| TestConfiguration {
            name: t.display_name().to_string(),
            library: t.library.clone(),
            entity: t.entity.clone(),
            architecture: t.architecture.clone(),
            generics: t
                .generics
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            elaborate_only: t.elaborate_only,
            fail_on_warning: t.fail_on_warning,
            timeout,
        })
        .collect()
}

/// Creates the configured backend adapter and verifies it is installed.
pub fn create_backend(config: &ProjectConfig) -> Result<Box<dyn Simulator>, Box<dyn Error>> {
    let backend = &config.backend;
    let simulator = create_simulator(backend.name.as_str(), &backend.standard, &backend.flags)
        .ok_or_else(|| format!("unknown backend '{}'", backend.name.as_str()))?;
    if !simulator.probe() {
        return Err(Box::new(SimError::ToolUnavailable {
            tool: simulator.name().to_string(),
        }));
    }
    Ok(simulator)
}
