//! `hdlrun test` — compile, then run all testbench configurations.
//!
//! Compiles the stale subset first, then hands the selected configurations
//! to the orchestrator. A compile failure does not stop the run: dependent
//! configurations are reported as "not run" while independent ones execute.

use std::error::Error;
use std::time::Duration;

use hdlrun_cache::{backend_fingerprint, CompileManifest};
use hdlrun_diagnostics::DiagnosticSink;
use hdlrun_project::{ResolveOptions, ScanOutput};
use hdlrun_run::{
    compile_project, run_tests, CompileSettings, RunSettings, RunSummary, TestOutcome,
};
use hdlrun_sim::{AbortSignal, SimStatus};

use crate::pipeline::{
    build_project, create_backend, library_mappings, load_project_config, scan_path,
    test_configurations,
};
use crate::{GlobalArgs, TestArgs};

/// Runs the `hdlrun test` command.
///
/// Returns the run's exit code: 0 when everything passed, 1 otherwise.
pub fn run(args: &TestArgs, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let (root, config) = load_project_config(global)?;

    if !global.quiet {
        eprintln!(
            "    Testing {} v{} ({})",
            config.project.name,
            config.project.version,
            config.backend.name.as_str()
        );
    }

    let configs = test_configurations(
        &config,
        args.name.as_deref(),
        args.filter.as_deref(),
        args.timeout.map(Duration::from_secs),
    );
    if configs.is_empty() {
        if !global.quiet {
            eprintln!("warning: no testbench configurations match");
        }
        return Ok(0);
    }

    let scan = ScanOutput::load(&scan_path(&root, args.scan.as_deref()))?;
    let project = build_project(&config, &root, &scan)?;
    let simulator = create_backend(&config)?;

    let design = project.resolve(ResolveOptions {
        package_bodies_required: simulator.capabilities().package_bodies_required,
    })?;

    let cache_dir = root.join(&config.build.cache_dir);
    let fingerprint = backend_fingerprint(
        config.backend.name.as_str(),
        &config.backend.standard,
        &config.backend.flags,
    );
    let mut manifest = CompileManifest::load_or_create(&cache_dir, &fingerprint);

    let abort = AbortSignal::new();
    let sink = DiagnosticSink::new();
    let workers = args.workers.unwrap_or(config.build.workers);
    let mappings = library_mappings(&project);

    let report = compile_project(
        &design,
        &mut manifest,
        simulator.as_ref(),
        &mappings,
        &CompileSettings {
            workers,
            standard: &config.backend.standard,
            cache_dir: &cache_dir,
        },
        &sink,
        &abort,
    );
    crate::compile::print_report(&report, global);

    let summary = run_tests(
        &design,
        &report,
        &configs,
        simulator.as_ref(),
        &mappings,
        &RunSettings {
            workers,
            output_dir: root.join(&config.build.output_dir),
        },
        &sink,
        &abort,
    );

    if !global.quiet {
        print_summary(&summary, global.verbose);
    }

    if let Some(path) = &args.json {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)?;
    }

    Ok(summary.exit_code())
}

/// Prints per-configuration status lines and the run totals.
fn print_summary(summary: &RunSummary, verbose: bool) {
    for outcome in &summary.outcomes {
        print_outcome(outcome, verbose);
    }

    if let Some(err) = &summary.post_process_error {
        eprintln!("warning: post-processing failed: {err}");
    }

    eprintln!();
    eprintln!(
        "     Result {} passed, {} failed, {} errored in {:.1}s",
        summary.passed,
        summary.failed,
        summary.errored,
        summary.total_elapsed.as_secs_f64()
    );
}

fn print_outcome(outcome: &TestOutcome, verbose: bool) {
    let elapsed = outcome.result.elapsed.as_secs_f64();
    match outcome.result.status {
        SimStatus::Passed => {
            eprintln!("       PASS {} ({elapsed:.1}s)", outcome.name);
        }
        SimStatus::Failed => {
            eprintln!("       FAIL {} ({elapsed:.1}s)", outcome.name);
            for line in failure_lines(outcome, verbose) {
                eprintln!("            {line}");
            }
        }
        SimStatus::Error => {
            eprintln!("      ERROR {}: {}", outcome.name, outcome.result.output);
        }
    }
}

/// The captured output lines worth echoing for a failed configuration:
/// everything under `--verbose`, classified diagnostics otherwise.
fn failure_lines(outcome: &TestOutcome, verbose: bool) -> Vec<String> {
    if verbose {
        outcome.result.output.lines().map(str::to_string).collect()
    } else {
        outcome
            .result
            .diagnostics
            .iter()
            .map(|d| d.to_string())
            .collect()
    }
}
