//! Classification of captured tool output into diagnostics.
//!
//! Simulator toolchains report problems as text on stdout/stderr. The runner
//! needs the severities in that text to apply the run's severity threshold
//! and to summarize failures, but it must not depend on any single tool's
//! exact formatting. This module scans each captured line for the
//! conventional severity markers used by NVC and GHDL (`error:`,
//! `** Warning:`, `(assertion warning)`, ...) and produces structured
//! [`Diagnostic`] values.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;

/// Severity markers searched for in each output line, most severe first.
///
/// Matching most severe first means a line like
/// `error: assertion warning exceeded` classifies as an error.
const MARKERS: [(&str, Severity); 4] = [
    ("failure", Severity::Failure),
    ("error", Severity::Error),
    ("warning", Severity::Warning),
    ("note", Severity::Note),
];

/// Extracts diagnostics from captured tool output.
///
/// Each line containing a severity marker (`error:`, `Warning:`,
/// `(assertion note)`, ...) yields one [`Diagnostic`] carrying the whole
/// line as its message. Lines without a marker are ignored; they are still
/// available to the user in the captured output.
pub fn classify_output(output: &str, tool: &str) -> Vec<Diagnostic> {
    output
        .lines()
        .filter_map(|line| classify_line(line).map(|sev| Diagnostic::new(sev, line.trim(), tool)))
        .collect()
}

/// Returns the most severe diagnostic level present, or `None` if empty.
pub fn max_severity(diagnostics: &[Diagnostic]) -> Option<Severity> {
    diagnostics.iter().map(|d| d.severity).max()
}

/// Classifies a single output line, returning its severity if it carries a
/// recognizable marker.
fn classify_line(line: &str) -> Option<Severity> {
    let lower = line.to_ascii_lowercase();
    for (marker, severity) in MARKERS {
        if has_marker(&lower, marker) {
            return Some(severity);
        }
    }
    None
}

/// Returns `true` if `lower` contains `marker` as a severity keyword.
///
/// A keyword counts when it is followed by a colon (`error:`, possibly with
/// a space before the colon as GHDL prints for assertions) or appears in an
/// assertion tag like `(assertion warning)`.
fn has_marker(lower: &str, marker: &str) -> bool {
    for (pos, _) in lower.match_indices(marker) {
        let rest = &lower[pos + marker.len()..];
        let rest = rest.trim_start();
        if rest.starts_with(':') || rest.starts_with(')') {
            return true;
        }
    }
    false
}
