//! Configuration types deserialized from `hdlrun.toml`.

use serde::Deserialize;
use std::collections::BTreeMap;

/// The top-level project configuration parsed from `hdlrun.toml`.
///
/// Declares the backend toolchain, the HDL libraries and their source files,
/// build settings, and the testbench configurations for a run.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Core project metadata (name, version).
    pub project: ProjectMeta,
    /// Backend toolchain selection and compile flags.
    #[serde(default)]
    pub backend: BackendConfig,
    /// Build settings (worker limits, output and cache directories).
    #[serde(default)]
    pub build: BuildConfig,
    /// Library declarations, keyed by library name.
    #[serde(default)]
    pub libraries: BTreeMap<String, LibraryConfig>,
    /// Testbench configurations, declared as `[[test]]` tables.
    #[serde(default, rename = "test")]
    pub tests: Vec<TestDecl>,
}

/// Core project metadata required in every `hdlrun.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// The project version string.
    pub version: String,
    /// A brief description of the project.
    #[serde(default)]
    pub description: String,
}

/// Backend toolchain selection and compile flags.
///
/// The backend name and compile flags together fingerprint the compile state
/// cache: changing either invalidates every cached entry, since compiled
/// artifacts are backend-specific.
#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    /// Which simulator toolchain to drive.
    #[serde(default)]
    pub name: BackendKind,
    /// VHDL standard revision passed to the backend (e.g. "2008").
    #[serde(default = "default_standard")]
    pub standard: String,
    /// Extra flags appended to every analysis invocation.
    #[serde(default)]
    pub flags: Vec<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            name: BackendKind::default(),
            standard: default_standard(),
            flags: Vec::new(),
        }
    }
}

fn default_standard() -> String {
    "2008".to_string()
}

/// The supported simulator backends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// The NVC simulator (default).
    #[default]
    Nvc,
    /// The GHDL simulator.
    Ghdl,
}

impl BackendKind {
    /// The executable / display name of this backend.
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Nvc => "nvc",
            BackendKind::Ghdl => "ghdl",
        }
    }
}

/// Build settings controlling concurrency and on-disk layout.
#[derive(Debug, Deserialize)]
pub struct BuildConfig {
    /// Maximum number of parallel compile/simulate workers (0 = auto-detect).
    #[serde(default)]
    pub workers: usize,
    /// Directory for compiled library artifacts and simulation output.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Directory for the compile state cache.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            output_dir: default_output_dir(),
            cache_dir: default_cache_dir(),
        }
    }
}

fn default_output_dir() -> String {
    "hdlrun_out".to_string()
}

fn default_cache_dir() -> String {
    ".hdlrun-cache".to_string()
}

/// A single library declaration.
#[derive(Debug, Deserialize)]
pub struct LibraryConfig {
    /// Source file paths registered into this library, in compile-tie-break
    /// order.
    pub files: Vec<String>,
}

/// A testbench configuration, declared as a `[[test]]` table.
///
/// This is the test-discovery input for a run: each declaration names a
/// runnable entity/architecture pair and the knobs for its simulation.
#[derive(Debug, Clone, Deserialize)]
pub struct TestDecl {
    /// Display name; defaults to the entity name when omitted.
    #[serde(default)]
    pub name: Option<String>,
    /// The library containing the testbench entity.
    pub library: String,
    /// The testbench entity name.
    pub entity: String,
    /// The architecture to elaborate.
    pub architecture: String,
    /// Generic values supplied at elaboration, keyed by generic name.
    ///
    /// Carried as a `BTreeMap` so the elaboration argument order is
    /// deterministic (sorted by key) across runs.
    #[serde(default)]
    pub generics: BTreeMap<String, String>,
    /// Build the runnable image but do not execute it.
    #[serde(default)]
    pub elaborate_only: bool,
    /// Fail the run on any diagnostic of warning severity or above.
    #[serde(default)]
    pub fail_on_warning: bool,
}

impl TestDecl {
    /// The display name for this testbench.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.entity)
    }
}
