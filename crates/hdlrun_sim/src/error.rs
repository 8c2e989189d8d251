//! Error types for the simulator layer.

/// Errors raised by simulator adapters outside the per-unit-of-work
/// outcome values.
///
/// Compile and simulation failures are *data* ([`CompileOutcome`],
/// [`SimulationResult`]) so they can be contained per file or per test
/// configuration. This enum covers the cases that abort a whole run or a
/// post-processing step.
///
/// [`CompileOutcome`]: crate::interface::CompileOutcome
/// [`SimulationResult`]: crate::interface::SimulationResult
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// The backend toolchain executable was not found in the environment.
    ///
    /// Fatal for the whole run: no adapter operation can proceed.
    #[error("simulator '{tool}' not found in PATH")]
    ToolUnavailable {
        /// The executable name that was probed for.
        tool: String,
    },

    /// An I/O error occurred during post-processing.
    #[error("post-processing failed at {path}: {source}")]
    PostProcess {
        /// The output path being processed.
        path: std::path::PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
