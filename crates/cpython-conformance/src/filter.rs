//! Test selection: skip-list loading and the filter set.

use crate::Result;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Default skip-list location, relative to the working directory.
pub const DEFAULT_SKIP_FILE: &str = "tests/skips.txt";

const MODULE_SUFFIX: &str = ".py";

/// Which tests a conformance run includes and excludes.
///
/// Nothing here is deduplicated; the engine decides what repeated names mean.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    /// Module names passed as `-x`, in skip-list order.
    pub exclusions: Vec<String>,
    /// Passed as `-k`.
    pub pattern: Option<String>,
    /// Explicit module names, passed last.
    pub tests: Vec<String>,
    /// Forwarded untouched, after the flags this crate builds.
    pub passthrough: Vec<String>,
}

/// Parse skip-list text: blank lines and `#` comments are dropped, a trailing
/// `.py` is removed so `test_ssl.py` and `test_ssl` mean the same module.
pub fn parse_exclusions(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.strip_suffix(MODULE_SUFFIX).unwrap_or(line).to_string())
        .collect()
}

/// Read the skip-list at `path`. A missing file means nothing is skipped.
pub fn load_exclusions(path: &Path) -> Result<Vec<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let names = parse_exclusions(&text);
            debug!("{} exclusions from {}", names.len(), path.display());
            Ok(names)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("no skip-list at {}", path.display());
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}
