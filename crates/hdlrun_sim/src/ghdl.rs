//! Backend adapter for the GHDL simulator.
//!
//! GHDL analyzes into a work library selected with `--work=`/`--workdir=`
//! and finds other libraries through `-P` search paths. It has no separate
//! package-body codegen stage, but consumers of a package must be compiled
//! after the package's body, so the adapter reports
//! `package_bodies_required` and the graph builder adds the synthetic
//! edges. Elaboration and run happen in one `--elab-run` invocation;
//! `--assert-level=` carries the severity threshold.

use hdlrun_diagnostics::classify_output;
use hdlrun_project::{FileKind, SourceFile};

use crate::interface::{
    run_status, Capabilities, CompileOutcome, LibraryMapping, RunConfig, SimStatus,
    SimulationResult, Simulator,
};
use crate::lookup::find_in_path;
use crate::process::{run_tool, AbortSignal};

/// The GHDL backend adapter.
pub struct GhdlSimulator {
    standard: String,
    flags: Vec<String>,
}

impl GhdlSimulator {
    /// Creates the adapter for a given VHDL standard and extra analysis
    /// flags.
    pub fn new(standard: impl Into<String>, flags: &[String]) -> Self {
        Self {
            standard: standard.into(),
            flags: flags.to_vec(),
        }
    }

    /// GHDL spells standards with two digits (`--std=08`).
    fn std_flag(standard: &str) -> String {
        let short = match standard {
            "1993" => "93",
            "2002" => "02",
            "2008" => "08",
            "2019" => "19",
            other => other,
        };
        format!("--std={short}")
    }

    /// Work-library selection plus `-P` search paths for every other
    /// library in the map.
    fn library_args(&self, libraries: &[LibraryMapping], work: &str) -> Vec<String> {
        let mut args = Vec::new();
        for lib in libraries {
            if lib.name.eq_ignore_ascii_case(work) {
                args.push(format!("--work={}", lib.name));
                args.push(format!("--workdir={}", lib.directory.display()));
            } else {
                args.push(format!("-P{}", lib.directory.display()));
            }
        }
        args
    }

    fn analysis_args(
        &self,
        file: &SourceFile,
        libraries: &[LibraryMapping],
        standard: &str,
    ) -> Vec<String> {
        let mut args = vec!["-a".to_string(), Self::std_flag(standard)];
        args.extend(self.library_args(libraries, &file.library));
        args.extend(self.flags.iter().cloned());
        args.push(file.path.display().to_string());
        args
    }

    fn simulate_args(
        &self,
        library: &str,
        entity: &str,
        architecture: &str,
        config: &RunConfig,
        libraries: &[LibraryMapping],
    ) -> Vec<String> {
        let command = if config.elaborate_only {
            "-e"
        } else {
            "--elab-run"
        };
        let mut args = vec![command.to_string(), Self::std_flag(&self.standard)];
        args.extend(self.library_args(libraries, library));
        args.push(entity.to_string());
        args.push(architecture.to_string());
        for (name, value) in &config.generics {
            args.push(format!("-g{name}={value}"));
        }
        if !config.elaborate_only {
            let severity = if config.fail_on_warning {
                "warning"
            } else {
                "error"
            };
            args.push(format!("--assert-level={severity}"));
        }
        args
    }
}

impl Simulator for GhdlSimulator {
    fn name(&self) -> &'static str {
        "ghdl"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            package_bodies_required: true,
            package_body_codegen: false,
        }
    }

    fn probe(&self) -> bool {
        find_in_path("ghdl").is_some()
    }

    fn compile_file(
        &self,
        file: &SourceFile,
        libraries: &[LibraryMapping],
        standard: &str,
        abort: &AbortSignal,
    ) -> CompileOutcome {
        if file.kind != FileKind::Vhdl {
            return CompileOutcome::failure(format!(
                "ghdl cannot compile {} file {}",
                file.kind,
                file.path.display()
            ));
        }

        let out = run_tool(
            "ghdl",
            &self.analysis_args(file, libraries, standard),
            None,
            abort,
        );
        CompileOutcome {
            success: out.success,
            output: out.output,
            elapsed: out.elapsed,
        }
    }

    fn simulate(
        &self,
        library: &str,
        entity: &str,
        architecture: &str,
        config: &RunConfig,
        libraries: &[LibraryMapping],
        abort: &AbortSignal,
    ) -> SimulationResult {
        let args = self.simulate_args(library, entity, architecture, config, libraries);
        let out = run_tool("ghdl", &args, config.timeout, abort);
        let diagnostics = classify_output(&out.output, self.name());

        let status = if out.aborted {
            SimStatus::Error
        } else {
            run_status(out.success, &diagnostics, config.fail_on_warning)
        };

        SimulationResult {
            status,
            output: out.output,
            diagnostics,
            elapsed: out.elapsed,
        }
    }
}

impl Default for GhdlSimulator {
    fn default() -> Self {
        Self::new("2008", &[])
    }
}
