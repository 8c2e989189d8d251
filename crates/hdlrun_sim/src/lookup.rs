//! Executable lookup policy.
//!
//! Backend probing must answer "is `nvc` on PATH?" identically on every
//! platform, including case-insensitive filesystems where a stale `NVC.exe`
//! must still count as present. Rather than encoding platform quirks in
//! ad-hoc filesystem checks, the policy here is explicit: executable-name
//! suffixing and name comparison are pure functions parameterized by
//! [`Platform`] and [`CaseSensitivity`], exercised in tests against
//! in-memory directory listings. Only [`find_in_path`] touches the live
//! environment.

use std::path::PathBuf;

/// The target platform's executable conventions.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Platform {
    /// Unix-like: no executable suffix.
    Unix,
    /// Windows: executables carry an `.exe` suffix.
    Windows,
}

impl Platform {
    /// The platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    /// The filesystem name-matching rule conventional on this platform.
    pub fn default_case_sensitivity(self) -> CaseSensitivity {
        match self {
            Platform::Unix => CaseSensitivity::Sensitive,
            Platform::Windows => CaseSensitivity::Insensitive,
        }
    }
}

/// How file names are compared when searching a directory listing.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CaseSensitivity {
    /// Names must match exactly.
    Sensitive,
    /// Names match regardless of ASCII case.
    Insensitive,
}

/// Returns the platform-specific file name for an executable.
///
/// Appends `.exe` on Windows unless the name already carries it.
pub fn executable_file_name(base: &str, platform: Platform) -> String {
    match platform {
        Platform::Unix => base.to_string(),
        Platform::Windows => {
            if base.to_ascii_lowercase().ends_with(".exe") {
                base.to_string()
            } else {
                format!("{base}.exe")
            }
        }
    }
}

/// Returns `true` if a directory listing contains `file_name` under the
/// given comparison rule.
pub fn listing_contains(entries: &[String], file_name: &str, case: CaseSensitivity) -> bool {
    match case {
        CaseSensitivity::Sensitive => entries.iter().any(|e| e == file_name),
        CaseSensitivity::Insensitive => entries
            .iter()
            .any(|e| e.eq_ignore_ascii_case(file_name)),
    }
}

/// Searches the live `PATH` for an executable, returning its full path.
///
/// Applies [`executable_file_name`] and [`listing_contains`] with the
/// current platform's conventions. Unreadable directories are skipped.
pub fn find_in_path(executable: &str) -> Option<PathBuf> {
    let platform = Platform::current();
    let file_name = executable_file_name(executable, platform);
    let case = platform.default_case_sensitivity();

    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        let entries: Vec<String> = match std::fs::read_dir(&dir) {
            Ok(rd) => rd
                .filter_map(|e| e.ok())
                .filter_map(|e| e.file_name().into_string().ok())
                .collect(),
            Err(_) => continue,
        };
        if listing_contains(&entries, &file_name, case) {
            return Some(dir.join(&file_name));
        }
    }
    None
}
