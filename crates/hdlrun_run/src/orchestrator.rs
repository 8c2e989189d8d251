//! Test orchestration: from compiled artifacts to an aggregated run report.
//!
//! Consumes the testbench configurations supplied by test discovery. Each
//! configuration first has its library dependency closure checked against
//! the compile report: if any file in the closure did not compile this run,
//! the configuration is recorded as "not run" (an error, distinct from a
//! failure) and the simulator is never invoked for it. Independent
//! configurations proceed normally. Configurations run fully in parallel on
//! a bounded thread pool, with one exclusive writer per library artifact
//! directory; after all of them finish, the backend's post-process hook
//! runs exactly once, regardless of individual outcomes.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use hdlrun_diagnostics::DiagnosticSink;
use hdlrun_project::ResolvedDesign;
use hdlrun_sim::{AbortSignal, LibraryMapping, RunConfig, SimulationResult, Simulator};
use rayon::prelude::*;

use crate::report::{RunSummary, TestOutcome};
use crate::scheduler::CompileReport;

/// One testbench configuration, as supplied by test discovery.
///
/// Immutable per run.
#[derive(Clone, Debug)]
pub struct TestConfiguration {
    /// Display name for reporting.
    pub name: String,
    /// The library containing the testbench entity.
    pub library: String,
    /// The testbench entity.
    pub entity: String,
    /// The architecture to elaborate.
    pub architecture: String,
    /// Generic assignments, in elaboration order.
    pub generics: Vec<(String, String)>,
    /// Build the runnable image without executing it.
    pub elaborate_only: bool,
    /// Fail on warning-severity diagnostics.
    pub fail_on_warning: bool,
    /// Wall-clock bound for the simulation process.
    pub timeout: Option<Duration>,
}

/// Knobs for the orchestration pass.
pub struct RunSettings {
    /// Maximum concurrent simulations (0 = rayon default).
    pub workers: usize,
    /// Run output directory, handed to the post-process hook.
    pub output_dir: PathBuf,
}

/// Runs every configuration and aggregates the summary.
///
/// A compile failure anywhere never aborts the run; it only forces
/// "not run" on the configurations whose dependency closure includes the
/// failed file.
pub fn run_tests(
    design: &ResolvedDesign<'_>,
    compile: &CompileReport,
    configs: &[TestConfiguration],
    simulator: &dyn Simulator,
    libraries: &[LibraryMapping],
    settings: &RunSettings,
    sink: &DiagnosticSink,
    abort: &AbortSignal,
) -> RunSummary {
    let start = Instant::now();

    // One exclusive writer per library artifact directory: elaboration
    // writes the runnable image into the testbench's library.
    let lib_locks: HashMap<String, Mutex<()>> = libraries
        .iter()
        .map(|l| (l.name.to_ascii_lowercase(), Mutex::new(())))
        .collect();

    let run_one = |config: &TestConfiguration| -> TestOutcome {
        let result =
            simulate_config(design, compile, config, simulator, libraries, &lib_locks, abort);
        sink.emit_all(result.diagnostics.iter().cloned());
        TestOutcome {
            name: config.name.clone(),
            library: config.library.clone(),
            result,
        }
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(settings.workers)
        .build();
    let outcomes: Vec<TestOutcome> = match pool {
        Ok(pool) => pool.install(|| configs.par_iter().map(run_one).collect()),
        // Pool construction can only fail on resource exhaustion; the run
        // still completes sequentially.
        Err(_) => configs.iter().map(run_one).collect(),
    };

    // The hook runs exactly once, whatever the individual outcomes were.
    let post_process_error = simulator
        .post_process(&settings.output_dir)
        .err()
        .map(|e| e.to_string());

    RunSummary::new(
        outcomes,
        compile.failure_count(),
        post_process_error,
        start.elapsed(),
    )
}

/// Runs one configuration, or records why it could not run.
fn simulate_config(
    design: &ResolvedDesign<'_>,
    compile: &CompileReport,
    config: &TestConfiguration,
    simulator: &dyn Simulator,
    libraries: &[LibraryMapping],
    lib_locks: &HashMap<String, Mutex<()>>,
    abort: &AbortSignal,
) -> SimulationResult {
    if abort.is_aborted() {
        return SimulationResult::not_run("not run: run aborted");
    }

    // Every file in the configuration's library dependency closure must
    // have compiled successfully this run.
    let closure = design.library_closure(&config.library);
    if closure.is_empty() {
        return SimulationResult::not_run(format!(
            "not run: library '{}' has no registered files",
            config.library
        ));
    }
    for file in closure {
        if !compile.compiled_ok(file) {
            return SimulationResult::not_run(format!(
                "not run: {} failed to compile",
                design.project().file(file).path.display()
            ));
        }
    }

    let run_config = RunConfig {
        generics: config.generics.clone(),
        elaborate_only: config.elaborate_only,
        fail_on_warning: config.fail_on_warning,
        timeout: config.timeout,
    };

    let guard = lib_locks
        .get(&config.library.to_ascii_lowercase())
        .map(|m| m.lock().unwrap());
    let result = simulator.simulate(
        &config.library,
        &config.entity,
        &config.architecture,
        &run_config,
        libraries,
        abort,
    );
    drop(guard);
    result
}
