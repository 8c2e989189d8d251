//! Configuration loading for hdlrun projects.
//!
//! A project is described by an `hdlrun.toml` file declaring the backend
//! toolchain, the HDL libraries with their source files, build settings, and
//! the testbench configurations to run.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str};
pub use types::{
    BackendConfig, BackendKind, BuildConfig, LibraryConfig, ProjectConfig, ProjectMeta, TestDecl,
};
