//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// VHDL standard revisions accepted by the supported backends.
const KNOWN_STANDARDS: [&str; 4] = ["1993", "2002", "2008", "2019"];

/// Loads and validates an `hdlrun.toml` configuration from a project directory.
///
/// Reads `<project_dir>/hdlrun.toml`, parses it, and validates required
/// fields and cross-references.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join("hdlrun.toml");
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates an `hdlrun.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates required fields and the internal consistency of a configuration.
///
/// Checks that project metadata is present, the VHDL standard is one of the
/// supported revisions, every declared library has at least one file, every
/// testbench references a declared library, and every generic assignment has
/// an identifier-shaped name and a non-empty value.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.project.version.is_empty() {
        return Err(ConfigError::MissingField("project.version".to_string()));
    }

    if !KNOWN_STANDARDS.contains(&config.backend.standard.as_str()) {
        return Err(ConfigError::UnsupportedStandard(
            config.backend.standard.clone(),
        ));
    }

    for (name, lib) in &config.libraries {
        if lib.files.is_empty() {
            return Err(ConfigError::MissingField(format!("libraries.{name}.files")));
        }
    }

    for test in &config.tests {
        if !config.libraries.contains_key(&test.library) {
            return Err(ConfigError::UnknownLibrary {
                test: test.display_name().to_string(),
                library: test.library.clone(),
            });
        }
        for (name, value) in &test.generics {
            if !is_identifier(name) {
                return Err(ConfigError::InvalidGeneric {
                    test: test.display_name().to_string(),
                    name: name.clone(),
                    reason: "not a valid identifier".to_string(),
                });
            }
            if value.is_empty() {
                return Err(ConfigError::InvalidGeneric {
                    test: test.display_name().to_string(),
                    name: name.clone(),
                    reason: "value is empty".to_string(),
                });
            }
        }
    }

    Ok(())
}

/// Returns `true` if `s` is shaped like an HDL identifier: a leading letter
/// followed by letters, digits, or underscores.
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
[project]
name = "uart"
version = "0.1.0"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.project.name, "uart");
        assert_eq!(config.project.version, "0.1.0");
        assert!(config.libraries.is_empty());
        assert!(config.tests.is_empty());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[project]
name = "uart"
version = "0.1.0"
description = "UART core with testbenches"

[backend]
name = "ghdl"
standard = "2008"
flags = ["-frelaxed"]

[build]
workers = 4
output_dir = "out"
cache_dir = ".cache"

[libraries.uart_lib]
files = ["src/uart_pkg.vhd", "src/uart_tx.vhd", "src/uart_rx.vhd"]

[libraries.tb_lib]
files = ["tests/tb_uart.vhd"]

[[test]]
library = "tb_lib"
entity = "tb_uart"
architecture = "sim"
generics = { baud = "9600" }
fail_on_warning = true

[[test]]
name = "tb_uart_smoke"
library = "tb_lib"
entity = "tb_uart"
architecture = "sim"
elaborate_only = true
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.backend.name, crate::types::BackendKind::Ghdl);
        assert_eq!(config.backend.flags, vec!["-frelaxed"]);
        assert_eq!(config.build.workers, 4);
        assert_eq!(config.libraries.len(), 2);
        assert_eq!(config.libraries["uart_lib"].files.len(), 3);
        assert_eq!(config.tests.len(), 2);
        assert!(config.tests[0].fail_on_warning);
        assert!(config.tests[1].elaborate_only);
    }

    #[test]
    fn missing_name_errors() {
        let toml = r#"
[project]
name = ""
version = "0.1.0"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn missing_version_errors() {
        let toml = r#"
[project]
name = "uart"
version = ""
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let toml = "this is not valid toml {{{}}}";
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn unsupported_standard_errors() {
        let toml = r#"
[project]
name = "uart"
version = "0.1.0"

[backend]
standard = "1987"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedStandard(_)));
    }

    #[test]
    fn empty_library_errors() {
        let toml = r#"
[project]
name = "uart"
version = "0.1.0"

[libraries.empty_lib]
files = []
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn test_with_unknown_library_errors() {
        let toml = r#"
[project]
name = "uart"
version = "0.1.0"

[[test]]
library = "nonexistent"
entity = "tb"
architecture = "sim"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownLibrary { .. }));
    }

    #[test]
    fn invalid_generic_name_errors() {
        let toml = r#"
[project]
name = "uart"
version = "0.1.0"

[libraries.tb_lib]
files = ["tb.vhd"]

[[test]]
library = "tb_lib"
entity = "tb"
architecture = "sim"
generics = { "2baud" = "9600" }
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGeneric { .. }));
    }

    #[test]
    fn empty_generic_value_errors() {
        let toml = r#"
[project]
name = "uart"
version = "0.1.0"

[libraries.tb_lib]
files = ["tb.vhd"]

[[test]]
library = "tb_lib"
entity = "tb"
architecture = "sim"
generics = { baud = "" }
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGeneric { .. }));
    }

    #[test]
    fn identifier_check() {
        assert!(is_identifier("baud_rate"));
        assert!(is_identifier("WIDTH"));
        assert!(is_identifier("g2"));
        assert!(!is_identifier("2baud"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("with-dash"));
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
