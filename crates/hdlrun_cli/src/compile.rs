//! `hdlrun compile` — resolve the project and compile every stale file.

use std::error::Error;

use hdlrun_cache::{backend_fingerprint, CompileManifest};
use hdlrun_diagnostics::DiagnosticSink;
use hdlrun_project::{ResolveOptions, ScanOutput};
use hdlrun_run::{compile_project, CompileReport, CompileSettings, CompileStatus};
use hdlrun_sim::AbortSignal;

use crate::pipeline::{
    build_project, create_backend, library_mappings, load_project_config, scan_path,
};
use crate::{CompileArgs, GlobalArgs};

/// Runs the `hdlrun compile` command.
///
/// Returns exit code 0 when every file is compiled and current, 1 when any
/// compile failed.
pub fn run(args: &CompileArgs, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let (root, config) = load_project_config(global)?;

    if !global.quiet {
        eprintln!(
            "  Compiling {} v{} ({})",
            config.project.name,
            config.project.version,
            config.backend.name.as_str()
        );
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

    let sink = DiagnosticSink::new();
    let report = compile_project(
        &design,
        &mut manifest,
        simulator.as_ref(),
        &library_mappings(&project),
        &CompileSettings {
            workers: args.workers.unwrap_or(config.build.workers),
            standard: &config.backend.standard,
            cache_dir: &cache_dir,
        },
        &sink,
        &AbortSignal::new(),
    );

    print_report(&report, global);
    if global.verbose && sink.error_count() > 0 {
        eprintln!("   {} error diagnostic(s) captured", sink.error_count());
    }

    if report.all_ok() {
        Ok(0)
    } else {
        Ok(1)
    }
}

/// Prints per-file lines and the compile summary.
pub fn print_report(report: &CompileReport, global: &GlobalArgs) {
    if global.quiet {
        return;
    }

    for result in &report.results {
        match result.status {
            CompileStatus::Compiled => {
                eprintln!("   Compiled {}", result.path.display());
            }
            CompileStatus::UpToDate => {
                if global.verbose {
                    eprintln!(" Up to date {}", result.path.display());
                }
            }
            CompileStatus::Failed => {
                eprintln!("     FAILED {}", result.path.display());
                for line in result.output.lines() {
                    eprintln!("            {line}");
                }
            }
            CompileStatus::Skipped => {
                eprintln!("    skipped {} ({})", result.path.display(), result.output);
            }
        }
    }

    let up_to_date = report
        .results
        .iter()
        .filter(|r| r.status == CompileStatus::UpToDate)
        .count();
    eprintln!(
        "   Finished {} compiled, {} up to date, {} failed",
        report.compiled_count(),
        up_to_date,
        report.failure_count()
    );
}
