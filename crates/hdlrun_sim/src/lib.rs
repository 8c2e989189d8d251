//! Simulator abstraction protocol and backend adapters.
//!
//! Every supported toolchain implements the [`Simulator`] trait: probe for
//! availability, compile one source file, elaborate-and-run one testbench
//! configuration, and an optional post-process hook after the run. Adapters
//! differ only in the concrete process invocations; failures of the external
//! tools are carried as explicit outcome values, never as panics or raw
//! errors.

#![warn(missing_docs)]

pub mod error;
pub mod ghdl;
pub mod interface;
pub mod lookup;
pub mod nvc;
pub mod process;

pub use error::SimError;
pub use ghdl::GhdlSimulator;
pub use interface::{
    run_status, Capabilities, CompileOutcome, LibraryMapping, RunConfig, SimStatus,
    SimulationResult, Simulator,
};
pub use nvc::NvcSimulator;
pub use process::{run_tool, AbortSignal, ToolOutput};

/// Creates the adapter for a backend by name.
///
/// `standard` is the VHDL revision (e.g. "2008") and `flags` are extra
/// analysis flags from the project configuration. Returns `None` for an
/// unknown backend name.
pub fn create_simulator(
    name: &str,
    standard: &str,
    flags: &[String],
) -> Option<Box<dyn Simulator>> {
    match name {
        "nvc" => Some(Box::new(NvcSimulator::new(standard, flags))),
        "ghdl" => Some(Box::new(GhdlSimulator::new(standard, flags))),
        _ => None,
    }
}
