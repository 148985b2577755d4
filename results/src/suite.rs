//! Suite identity derived from directory names.
//!
//! Suite directories are conventionally named
//! `<suite-name>-<n1>-<n2>-<n3>-<n4>-<n5>-<n6>`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static SUITE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z0-9_\-]+)(?:-[0-9]+){6}").expect("valid suite name regex")
});

/// Suite name encoded in a directory name, if it follows the convention.
///
/// The search is unanchored and greedy, so the name is the longest leading
/// run of word and hyphen characters that is still followed by six numeric
/// groups: `a-1-2-3-4-5-6-7` yields `a-1`.
pub fn resolve_suite_name(dir_name: &str) -> Option<String> {
    SUITE_NAME_RE
        .captures(dir_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Identity of a suite within one run
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuiteKey {
    /// Name resolved from the directory name
    Named(String),
    /// Directory whose name does not follow the convention
    Unmatched(PathBuf),
}

impl SuiteKey {
    /// Key for a suite directory, resolved from its base name
    pub fn for_dir(dir: &Path) -> Self {
        dir.file_name()
            .and_then(|name| name.to_str())
            .and_then(resolve_suite_name)
            .map(SuiteKey::Named)
            .unwrap_or_else(|| SuiteKey::Unmatched(dir.to_path_buf()))
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            SuiteKey::Named(name) => Some(name),
            SuiteKey::Unmatched(_) => None,
        }
    }
}

impl fmt::Display for SuiteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuiteKey::Named(name) => f.write_str(name),
            SuiteKey::Unmatched(dir) => {
                let base = dir
                    .file_name()
                    .map(|n| n.to_string_lossy())
                    .unwrap_or_else(|| dir.to_string_lossy());
                write!(f, "<unnamed:{}>", base)
            }
        }
    }
}
