//! Aggregated run results for the reporting collaborator.

use std::time::Duration;

use hdlrun_sim::{SimStatus, SimulationResult};
use serde::Serialize;

/// The recorded outcome of one testbench configuration.
#[derive(Clone, Debug, Serialize)]
pub struct TestOutcome {
    /// The configuration's display name.
    pub name: String,
    /// The library containing the testbench.
    pub library: String,
    /// The simulation result (status, captured output, elapsed time).
    pub result: SimulationResult,
}

/// The aggregated summary of a whole run.
///
/// Serializable so an external reporter can consume it; the exit code
/// derivation lives here so every caller agrees on what "success" means.
#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    /// Per-configuration outcomes, in declaration order.
    pub outcomes: Vec<TestOutcome>,
    /// Number of configurations that passed.
    pub passed: usize,
    /// Number of configurations that ran and failed.
    pub failed: usize,
    /// Number of configurations that could not run (dependency compile
    /// failure, abort, tool fault).
    pub errored: usize,
    /// Number of source files whose compile failed or was skipped.
    pub compile_failures: usize,
    /// Error text from the backend's post-process hook, if it failed.
    pub post_process_error: Option<String>,
    /// Wall-clock time of the whole run.
    pub total_elapsed: Duration,
}

impl RunSummary {
    /// Builds a summary from per-configuration outcomes.
    pub fn new(
        outcomes: Vec<TestOutcome>,
        compile_failures: usize,
        post_process_error: Option<String>,
        total_elapsed: Duration,
    ) -> Self {
        let passed = count(&outcomes, SimStatus::Passed);
        let failed = count(&outcomes, SimStatus::Failed);
        let errored = count(&outcomes, SimStatus::Error);
        Self {
            outcomes,
            passed,
            failed,
            errored,
            compile_failures,
            post_process_error,
            total_elapsed,
        }
    }

    /// `true` iff every configuration passed and nothing failed to compile.
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errored == 0 && self.compile_failures == 0
    }

    /// The process exit code for this run: zero on full success, one
    /// otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }
}

fn count(outcomes: &[TestOutcome], status: SimStatus) -> usize {
    outcomes.iter().filter(|o| o.result.status == status).count()
}
