//! Error types for configuration loading and validation.

/// Errors that can occur when loading or validating an `hdlrun.toml`
/// configuration. All of them are fatal: nothing is compiled or simulated
/// when the configuration is invalid.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A required field is missing from the configuration.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A testbench declaration references a library that is not declared.
    #[error("test '{test}' references unknown library '{library}'")]
    UnknownLibrary {
        /// The testbench name.
        test: String,
        /// The undeclared library name.
        library: String,
    },

    /// A generic assignment in a testbench declaration is invalid.
    #[error("test '{test}' has invalid generic '{name}': {reason}")]
    InvalidGeneric {
        /// The testbench name.
        test: String,
        /// The offending generic name.
        name: String,
        /// Why the assignment was rejected.
        reason: String,
    },

    /// The configured VHDL standard revision is not recognized.
    #[error("unsupported VHDL standard '{0}' (expected 1993, 2002, 2008 or 2019)")]
    UnsupportedStandard(String),
}
