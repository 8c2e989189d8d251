//! An in-process fake backend for scheduler and orchestrator tests.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use hdlrun_project::SourceFile;
use hdlrun_sim::{
    AbortSignal, Capabilities, CompileOutcome, LibraryMapping, RunConfig, SimError, SimStatus,
    SimulationResult, Simulator,
};

/// Everything the mock backend was asked to do, in call order.
#[derive(Default, Clone)]
pub struct MockCalls {
    /// Paths handed to `compile_file`.
    pub compiled: Vec<PathBuf>,
    /// Entity names handed to `simulate`.
    pub simulated: Vec<String>,
    /// Number of `post_process` invocations.
    pub post_process: usize,
}

/// A scriptable `Simulator` with no external processes behind it.
#[derive(Default)]
pub struct MockSimulator {
    fail_compiles: HashSet<String>,
    fail_sims: HashSet<String>,
    fail_post_process: bool,
    calls: Mutex<MockCalls>,
}

impl MockSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `compile_file` fail for the file at `path`.
    pub fn failing_compile(mut self, path: &str) -> Self {
        self.fail_compiles.insert(path.to_string());
        self
    }

    /// Makes `simulate` fail for the given entity.
    pub fn failing_sim(mut self, entity: &str) -> Self {
        self.fail_sims.insert(entity.to_string());
        self
    }

    /// Makes `post_process` report an error.
    pub fn failing_post_process(mut self) -> Self {
        self.fail_post_process = true;
        self
    }

    /// A snapshot of the recorded calls.
    pub fn calls(&self) -> MockCalls {
        self.calls.lock().unwrap().clone()
    }
}

impl Simulator for MockSimulator {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    fn probe(&self) -> bool {
        true
    }

    fn compile_file(
        &self,
        file: &SourceFile,
        _libraries: &[LibraryMapping],
        _standard: &str,
        _abort: &AbortSignal,
    ) -> CompileOutcome {
        self.calls.lock().unwrap().compiled.push(file.path.clone());
        let failing = self
            .fail_compiles
            .contains(file.path.to_str().unwrap_or_default());
        CompileOutcome {
            success: !failing,
            output: if failing {
                format!("mock: error: analysis of {} failed", file.path.display())
            } else {
                String::new()
            },
            elapsed: Duration::from_millis(1),
        }
    }

    fn simulate(
        &self,
        _library: &str,
        entity: &str,
        _architecture: &str,
        _config: &RunConfig,
        _libraries: &[LibraryMapping],
        _abort: &AbortSignal,
    ) -> SimulationResult {
        self.calls.lock().unwrap().simulated.push(entity.to_string());
        let failing = self.fail_sims.contains(entity);
        let output = if failing {
            format!("mock: error: assertion failed in {entity}")
        } else {
            String::new()
        };
        SimulationResult {
            status: if failing {
                SimStatus::Failed
            } else {
                SimStatus::Passed
            },
            diagnostics: hdlrun_diagnostics::classify_output(&output, self.name()),
            output,
            elapsed: Duration::from_millis(1),
        }
    }

    fn post_process(&self, output_path: &Path) -> Result<(), SimError> {
        self.calls.lock().unwrap().post_process += 1;
        if self.fail_post_process {
            Err(SimError::PostProcess {
                path: output_path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "mock failure"),
            })
        } else {
            Ok(())
        }
    }
}
