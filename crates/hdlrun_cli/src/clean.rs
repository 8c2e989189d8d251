//! `hdlrun clean` — drop the compile cache and compiled artifacts.

use std::error::Error;
use std::path::Path;

use crate::pipeline::load_project_config;
use crate::GlobalArgs;

/// Runs the `hdlrun clean` command.
///
/// Removes the cache directory and the output directory. Missing
/// directories are fine; the next run simply starts fresh.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let (root, config) = load_project_config(global)?;

    remove_dir(&root.join(&config.build.cache_dir), global)?;
    remove_dir(&root.join(&config.build.output_dir), global)?;

    Ok(0)
}

fn remove_dir(dir: &Path, global: &GlobalArgs) -> Result<(), Box<dyn Error>> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => {
            if !global.quiet {
                eprintln!("    Removed {}", dir.display());
            }
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(format!("failed to remove {}: {e}", dir.display()).into()),
    }
}
