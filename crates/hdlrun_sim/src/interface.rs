//! The capability contract every backend adapter implements.

use std::path::{Path, PathBuf};
use std::time::Duration;

use hdlrun_diagnostics::{Diagnostic, Severity};
use hdlrun_project::SourceFile;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::process::AbortSignal;

/// What the active backend requires from the scheduling layers.
#[derive(Clone, Copy, Debug, Default)]
pub struct Capabilities {
    /// Files using a package must also depend on the file defining the
    /// package's body. The graph builder adds synthetic edges when set.
    pub package_bodies_required: bool,
    /// Package bodies need a separate code generation stage after their
    /// file's analysis succeeds.
    pub package_body_codegen: bool,
}

/// One entry of the resolved library map: a library name and its artifact
/// directory.
///
/// The map is passed explicitly into every adapter operation (it is the
/// only cross-operation context an adapter sees), ordered by library
/// registration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LibraryMapping {
    /// The library name.
    pub name: String,
    /// The library's compiled-artifact directory.
    pub directory: PathBuf,
}

impl LibraryMapping {
    /// Creates a mapping entry.
    pub fn new(name: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
        }
    }
}

/// Per-configuration simulation knobs.
#[derive(Clone, Debug, Default)]
pub struct RunConfig {
    /// Generic values applied at elaboration, in the order given.
    pub generics: Vec<(String, String)>,
    /// Build the runnable image but skip execution.
    pub elaborate_only: bool,
    /// Fail on any diagnostic of warning severity or above.
    pub fail_on_warning: bool,
    /// Wall-clock bound for the external process, if any.
    pub timeout: Option<Duration>,
}

/// Outcome of one testbench configuration execution.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimStatus {
    /// The simulation ran and met the severity threshold.
    Passed,
    /// The simulation ran but violated the threshold or exited non-zero.
    Failed,
    /// The simulation could not run (aborted, tool fault, or skipped
    /// because a dependency failed to compile).
    Error,
}

/// The immutable record of one simulation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Pass/fail/error status.
    pub status: SimStatus,
    /// Combined captured stdout/stderr of the simulation.
    pub output: String,
    /// Diagnostics classified from the captured output.
    pub diagnostics: Vec<Diagnostic>,
    /// Wall-clock time of the external invocation.
    pub elapsed: Duration,
}

impl SimulationResult {
    /// A result for a configuration that never reached the simulator.
    pub fn not_run(reason: impl Into<String>) -> Self {
        Self {
            status: SimStatus::Error,
            output: reason.into(),
            diagnostics: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }
}

/// Outcome of compiling a single source file (and any backend-specific
/// post-analysis stage).
#[derive(Clone, Debug)]
pub struct CompileOutcome {
    /// `true` iff analysis (and codegen, where applicable) succeeded.
    pub success: bool,
    /// Combined captured tool output.
    pub output: String,
    /// Wall-clock time of the invocation(s).
    pub elapsed: Duration,
}

impl CompileOutcome {
    /// A failure outcome with a message and no elapsed time.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
            elapsed: Duration::ZERO,
        }
    }
}

/// Applies the run severity threshold to a finished simulation.
///
/// With `fail_on_warning`, any diagnostic of warning severity or above
/// fails the run; otherwise only error severity or above does. A non-zero
/// exit fails regardless of diagnostics (the backend is also told the exit
/// severity, so whichever signal arrives first wins).
pub fn run_status(exit_success: bool, diagnostics: &[Diagnostic], fail_on_warning: bool) -> SimStatus {
    let threshold = if fail_on_warning {
        Severity::Warning
    } else {
        Severity::Error
    };
    let violated = diagnostics.iter().any(|d| d.severity >= threshold);
    if exit_success && !violated {
        SimStatus::Passed
    } else {
        SimStatus::Failed
    }
}

/// The protocol implemented once per backend toolchain.
///
/// Adapters are stateless beyond their construction-time configuration:
/// the library map is passed into every operation, and all failure modes of
/// the external tools are returned as outcome values.
pub trait Simulator: Send + Sync {
    /// The backend's executable / display name.
    fn name(&self) -> &'static str;

    /// The backend's scheduling requirements.
    fn capabilities(&self) -> Capabilities;

    /// Returns `true` if the backend toolchain is present in the execution
    /// environment. Checked before any work is attempted.
    fn probe(&self) -> bool;

    /// Compiles one source file into its library.
    ///
    /// `libraries` is the full resolved library map; the file's own library
    /// is the sole writable target, every other library is mapped read-only.
    /// For backends with [`Capabilities::package_body_codegen`], each
    /// package body defined by the file gets its code generation stage
    /// immediately after a successful analysis.
    fn compile_file(
        &self,
        file: &SourceFile,
        libraries: &[LibraryMapping],
        standard: &str,
        abort: &AbortSignal,
    ) -> CompileOutcome;

    /// Elaborates (and unless `config.elaborate_only`, runs) one testbench
    /// configuration.
    fn simulate(
        &self,
        library: &str,
        entity: &str,
        architecture: &str,
        config: &RunConfig,
        libraries: &[LibraryMapping],
        abort: &AbortSignal,
    ) -> SimulationResult;

    /// Hook invoked exactly once after all simulations of a run complete,
    /// regardless of individual outcomes (e.g. to merge coverage).
    fn post_process(&self, _output_path: &Path) -> Result<(), SimError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warning() -> Diagnostic {
        Diagnostic::warning("metavalue detected", "nvc")
    }

    fn note() -> Diagnostic {
        Diagnostic::new(Severity::Note, "loading library", "nvc")
    }

    #[test]
    fn clean_run_passes() {
        assert_eq!(run_status(true, &[], false), SimStatus::Passed);
        assert_eq!(run_status(true, &[], true), SimStatus::Passed);
    }

    #[test]
    fn warning_only_fails_under_strict_threshold() {
        let diags = vec![warning()];
        // Identical run, only the flag differs.
        assert_eq!(run_status(true, &diags, false), SimStatus::Passed);
        assert_eq!(run_status(true, &diags, true), SimStatus::Failed);
    }

    #[test]
    fn error_fails_under_both_thresholds() {
        let diags = vec![Diagnostic::error("assertion failed", "nvc")];
        assert_eq!(run_status(true, &diags, false), SimStatus::Failed);
        assert_eq!(run_status(true, &diags, true), SimStatus::Failed);
    }

    #[test]
    fn notes_never_fail() {
        let diags = vec![note(), note()];
        assert_eq!(run_status(true, &diags, true), SimStatus::Passed);
    }

    #[test]
    fn nonzero_exit_fails_without_diagnostics() {
        assert_eq!(run_status(false, &[], false), SimStatus::Failed);
    }

    #[test]
    fn not_run_result_is_error() {
        let result = SimulationResult::not_run("dependency failed to compile");
        assert_eq!(result.status, SimStatus::Error);
        assert!(result.output.contains("dependency"));
        assert_eq!(result.elapsed, Duration::ZERO);
    }

    #[test]
    fn sim_status_serde_snake_case() {
        assert_eq!(serde_json::to_string(&SimStatus::Passed).unwrap(), "\"passed\"");
        assert_eq!(serde_json::to_string(&SimStatus::Error).unwrap(), "\"error\"");
    }
}
