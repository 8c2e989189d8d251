//! Diagnostic severity levels ordered from least to most severe.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The severity level of a diagnostic message.
///
/// Ordered from least severe (`Note`) to most severe (`Failure`), matching the
/// derived `PartialOrd`/`Ord` implementation based on declaration order. The
/// levels mirror VHDL assertion severities as reported by simulator output,
/// with `Failure` covering both `failure`-level assertions and hard tool
/// errors.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Severity {
    /// An informational note providing additional context.
    Note,
    /// A potential issue that fails a run only under a strict threshold.
    Warning,
    /// A definite problem that fails the run under the default threshold.
    Error,
    /// An unrecoverable failure reported by the tool.
    Failure,
}

impl Severity {
    /// Returns `true` if this severity is at least [`Error`](Severity::Error).
    pub fn is_error(self) -> bool {
        self >= Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Failure => write!(f, "failure"),
        }
    }
}
