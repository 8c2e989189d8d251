//! hdlrun CLI — the command-line interface for the hdlrun test runner.
//!
//! Provides `hdlrun compile` for incremental compilation, `hdlrun test` for
//! running all testbench configurations, `hdlrun probe` for checking which
//! backends are installed, and `hdlrun clean` for dropping the cache and
//! compiled artifacts.

#![warn(missing_docs)]

mod clean;
mod compile;
mod pipeline;
mod probe;
mod test;

use std::process;

use clap::{Parser, Subcommand};

/// hdlrun — an incremental HDL testbench runner.
#[derive(Parser, Debug)]
#[command(name = "hdlrun", version, about = "Incremental HDL testbench runner")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `hdlrun.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the project and compile every stale file.
    Compile(CompileArgs),
    /// Compile, then run all testbench configurations.
    Test(TestArgs),
    /// Report which simulator backends are installed.
    Probe,
    /// Remove the compile cache and all compiled artifacts.
    Clean,
}

/// Arguments for the `hdlrun compile` subcommand.
#[derive(Parser, Debug)]
pub struct CompileArgs {
    /// Path to the scanner's JSON output (default: `scan.json` next to the
    /// configuration).
    #[arg(long)]
    pub scan: Option<String>,

    /// Maximum parallel compile workers (overrides the configuration).
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,
}

/// Arguments for the `hdlrun test` subcommand.
#[derive(Parser, Debug)]
pub struct TestArgs {
    /// Specific testbench name to run (optional).
    pub name: Option<String>,

    /// Substring filter for testbench names.
    #[arg(long)]
    pub filter: Option<String>,

    /// Path to the scanner's JSON output (default: `scan.json` next to the
    /// configuration).
    #[arg(long)]
    pub scan: Option<String>,

    /// Maximum parallel workers (overrides the configuration).
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Per-simulation wall-clock limit in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Write the machine-readable run summary to this JSON file.
    #[arg(long)]
    pub json: Option<String>,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Compile(ref args) => compile::run(args, &global),
        Command::Test(ref args) => test::run(args, &global),
        Command::Probe => probe::run(&global),
        Command::Clean => clean::run(&global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(2);
        }
    }
}
