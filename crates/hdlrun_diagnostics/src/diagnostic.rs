//! Structured diagnostic messages extracted from tool output.

use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single diagnostic message with its severity.
///
/// Diagnostics originate in the captured output of external simulator
/// processes, so unlike compiler-internal diagnostics they carry no source
/// spans: only the severity, the message text, and the name of the tool
/// that produced them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The diagnostic message as reported by the tool.
    pub message: String,
    /// The name of the tool that emitted the diagnostic (e.g. "nvc").
    pub tool: String,
}

impl Diagnostic {
    /// Creates a new diagnostic with the given severity.
    pub fn new(severity: Severity, message: impl Into<String>, tool: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            tool: tool.into(),
        }
    }

    /// Creates an error diagnostic.
    pub fn error(message: impl Into<String>, tool: impl Into<String>) -> Self {
        Self::new(Severity::Error, message, tool)
    }

    /// Creates a warning diagnostic.
    pub fn warning(message: impl Into<String>, tool: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message, tool)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.tool, self.severity, self.message)
    }
}
