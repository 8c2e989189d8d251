//! `hdlrun probe` — report which simulator backends are installed.

use std::error::Error;

use hdlrun_sim::create_simulator;

use crate::GlobalArgs;

/// Backend names checked by `hdlrun probe`.
const BACKENDS: [&str; 2] = ["nvc", "ghdl"];

/// Runs the `hdlrun probe` command.
///
/// Returns exit code 0 if at least one backend is available, 1 otherwise.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let mut any_found = false;

    for name in BACKENDS {
        // The standard/flags are irrelevant for probing.
        let simulator = create_simulator(name, "2008", &[])
            .ok_or_else(|| format!("unknown backend '{name}'"))?;
        let found = simulator.probe();
        any_found |= found;
        if !global.quiet {
            let status = if found { "found" } else { "not found" };
            eprintln!("  {name:>10} {status}");
        }
    }

    Ok(if any_found { 0 } else { 1 })
}
