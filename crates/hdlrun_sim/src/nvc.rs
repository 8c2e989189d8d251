//! Backend adapter for the NVC simulator.
//!
//! NVC analyzes each file into its work library (`-a`), needs a separate
//! code generation stage for package bodies (`--codegen`), and elaborates
//! and runs in a single invocation (`-e ... -r ...`). Other libraries are
//! mapped read-only with `--map=name:dir`; the file's own library is the
//! sole writable target via `--work=name:dir`.

use hdlrun_diagnostics::classify_output;
use hdlrun_project::{FileKind, SourceFile};

use crate::interface::{
    run_status, Capabilities, CompileOutcome, LibraryMapping, RunConfig, SimStatus,
    SimulationResult, Simulator,
};
use crate::lookup::find_in_path;
use crate::process::{run_tool, AbortSignal};

/// The NVC backend adapter.
pub struct NvcSimulator {
    standard: String,
    flags: Vec<String>,
}

impl NvcSimulator {
    /// Creates the adapter for a given VHDL standard and extra analysis
    /// flags.
    pub fn new(standard: impl Into<String>, flags: &[String]) -> Self {
        Self {
            standard: standard.into(),
            flags: flags.to_vec(),
        }
    }

    /// The `--map`/`--work` arguments for a resolved library map.
    ///
    /// Every library is mapped; the work library additionally becomes the
    /// writable target.
    fn library_args(&self, libraries: &[LibraryMapping], work: &str) -> Vec<String> {
        let mut args = Vec::new();
        for lib in libraries {
            args.push(format!("--map={}:{}", lib.name, lib.directory.display()));
            if lib.name.eq_ignore_ascii_case(work) {
                args.push(format!("--work={}:{}", lib.name, lib.directory.display()));
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
        let mut args = vec![format!("--std={standard}"), "--ignore-time".to_string()];
        args.extend(self.library_args(libraries, &file.library));
        args.extend(self.flags.iter().cloned());
        args.push("-a".to_string());
        args.push(file.path.display().to_string());
        args
    }

    fn codegen_args(
        &self,
        unit_name: &str,
        work: &str,
        libraries: &[LibraryMapping],
        standard: &str,
    ) -> Vec<String> {
        let mut args = vec![format!("--std={standard}")];
        args.extend(self.library_args(libraries, work));
        args.push("--codegen".to_string());
        args.push(unit_name.to_string());
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
        let mut args = vec![format!("--std={}", self.standard), "--ignore-time".to_string()];
        args.extend(self.library_args(libraries, library));
        args.push("-e".to_string());
        args.push(entity.to_string());
        args.push(architecture.to_string());
        for (name, value) in &config.generics {
            args.push(format!("-g{name}={value}"));
        }
        if !config.elaborate_only {
            args.push("-r".to_string());
            args.push(entity.to_string());
            args.push(architecture.to_string());
            let severity = if config.fail_on_warning {
                "warning"
            } else {
                "error"
            };
            args.push(format!("--exit-severity={severity}"));
        }
        args
    }
}

impl Simulator for NvcSimulator {
    fn name(&self) -> &'static str {
        "nvc"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            package_bodies_required: false,
            package_body_codegen: true,
        }
    }

    fn probe(&self) -> bool {
        find_in_path("nvc").is_some()
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
                "nvc cannot compile {} file {}",
                file.kind,
                file.path.display()
            ));
        }

        let analysis = run_tool("nvc", &self.analysis_args(file, libraries, standard), None, abort);
        let mut output = analysis.output;
        let mut elapsed = analysis.elapsed;
        if !analysis.success {
            return CompileOutcome {
                success: false,
                output,
                elapsed,
            };
        }

        // Package bodies need their codegen stage right after analysis.
        for body in file.package_bodies() {
            let stage = run_tool(
                "nvc",
                &self.codegen_args(&body.name, &file.library, libraries, standard),
                None,
                abort,
            );
            output.push_str(&stage.output);
            elapsed += stage.elapsed;
            if !stage.success {
                return CompileOutcome {
                    success: false,
                    output,
                    elapsed,
                };
            }
        }

        CompileOutcome {
            success: true,
            output,
            elapsed,
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
        let out = run_tool("nvc", &args, config.timeout, abort);
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

impl Default for NvcSimulator {
    fn default() -> Self {
        Self::new("2008", &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdlrun_common::ContentHash;
    use hdlrun_project::{DesignUnit, UnitKind};
    use std::path::PathBuf;

    fn libs() -> Vec<LibraryMapping> {
        vec![
            LibraryMapping::new("core", "out/core"),
            LibraryMapping::new("tb", "out/tb"),
        ]
    }

    fn vhdl_file(library: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from("src/uart_pkg.vhd"),
            kind: FileKind::Vhdl,
            library: library.to_string(),
            content_hash: ContentHash::from_bytes(b"pkg"),
            units: vec![
                DesignUnit::new("uart_pkg", UnitKind::Package),
                DesignUnit::new("uart_pkg", UnitKind::PackageBody),
            ],
        }
    }

    #[test]
    fn capability_flags() {
        let sim = NvcSimulator::default();
        assert!(sim.capabilities().package_body_codegen);
        assert!(!sim.capabilities().package_bodies_required);
    }

    #[test]
    fn analysis_args_map_all_work_own() {
        let sim = NvcSimulator::new("2008", &[]);
        let file = vhdl_file("core");
        let args = sim.analysis_args(&file, &libs(), "2008");
        assert_eq!(
            args,
            vec![
                "--std=2008",
                "--ignore-time",
                "--map=core:out/core",
                "--work=core:out/core",
                "--map=tb:out/tb",
                "-a",
                "src/uart_pkg.vhd",
            ]
        );
    }

    #[test]
    fn analysis_args_include_extra_flags() {
        let sim = NvcSimulator::new("2008", &["--relaxed".to_string()]);
        let file = vhdl_file("core");
        let args = sim.analysis_args(&file, &libs(), "2008");
        let a_pos = args.iter().position(|a| a == "-a").unwrap();
        let flag_pos = args.iter().position(|a| a == "--relaxed").unwrap();
        assert!(flag_pos < a_pos, "flags must precede -a");
    }

    #[test]
    fn codegen_args_name_the_unit() {
        let sim = NvcSimulator::new("2008", &[]);
        let args = sim.codegen_args("uart_pkg", "core", &libs(), "2008");
        assert_eq!(
            args,
            vec![
                "--std=2008",
                "--map=core:out/core",
                "--work=core:out/core",
                "--map=tb:out/tb",
                "--codegen",
                "uart_pkg",
            ]
        );
    }

    #[test]
    fn simulate_args_elaborate_and_run() {
        let sim = NvcSimulator::new("2008", &[]);
        let config = RunConfig {
            generics: vec![("baud".to_string(), "9600".to_string())],
            elaborate_only: false,
            fail_on_warning: false,
            timeout: None,
        };
        let args = sim.simulate_args("tb", "tb_uart", "sim", &config, &libs());
        assert_eq!(
            args,
            vec![
                "--std=2008",
                "--ignore-time",
                "--map=core:out/core",
                "--map=tb:out/tb",
                "--work=tb:out/tb",
                "-e",
                "tb_uart",
                "sim",
                "-gbaud=9600",
                "-r",
                "tb_uart",
                "sim",
                "--exit-severity=error",
            ]
        );
    }

    #[test]
    fn simulate_args_elaborate_only_stops_at_e() {
        let sim = NvcSimulator::new("2008", &[]);
        let config = RunConfig {
            elaborate_only: true,
            ..RunConfig::default()
        };
        let args = sim.simulate_args("tb", "tb_uart", "sim", &config, &libs());
        assert!(args.contains(&"-e".to_string()));
        assert!(!args.contains(&"-r".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("--exit-severity")));
    }

    #[test]
    fn simulate_args_fail_on_warning_escalates() {
        let sim = NvcSimulator::new("2008", &[]);
        let config = RunConfig {
            fail_on_warning: true,
            ..RunConfig::default()
        };
        let args = sim.simulate_args("tb", "tb_uart", "sim", &config, &libs());
        assert!(args.contains(&"--exit-severity=warning".to_string()));
    }

    #[test]
    fn generics_keep_given_order() {
        let sim = NvcSimulator::new("2008", &[]);
        let config = RunConfig {
            generics: vec![
                ("width".to_string(), "8".to_string()),
                ("baud".to_string(), "9600".to_string()),
            ],
            ..RunConfig::default()
        };
        let args = sim.simulate_args("tb", "tb", "sim", &config, &libs());
        let w = args.iter().position(|a| a == "-gwidth=8").unwrap();
        let b = args.iter().position(|a| a == "-gbaud=9600").unwrap();
        assert!(w < b, "generic order must follow the config");
    }

    #[test]
    fn verilog_file_is_structured_failure() {
        let sim = NvcSimulator::default();
        let file = SourceFile {
            path: PathBuf::from("src/top.v"),
            kind: FileKind::Verilog,
            library: "core".to_string(),
            content_hash: ContentHash::from_bytes(b"module"),
            units: vec![],
        };
        let outcome = sim.compile_file(&file, &libs(), "2008", &AbortSignal::new());
        assert!(!outcome.success);
        assert!(outcome.output.contains("verilog"));
    }
}
