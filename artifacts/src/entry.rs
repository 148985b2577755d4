//! Entry classification.
//!
//! Archives are recognized purely by the suffix of their base name. This is a
//! naming heuristic, not a content check: a misnamed file is misclassified.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Component, Path, PathBuf};

/// Suffixes recognized as archives when no override is configured
pub const DEFAULT_ARCHIVE_SUFFIXES: [&str; 4] = ["tar", "gz", "bz2", "xz"];

/// Kind of artifact a user-supplied path names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// An existing directory, analyzed as one suite directory
    Directory,
    /// A file whose name ends with an archive suffix
    Archive,
    /// Anything else
    Unrecognized,
}

/// Name-suffix heuristic used to spot archives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchiveSuffixes(Vec<String>);

impl ArchiveSuffixes {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(suffixes.into_iter().map(Into::into).collect())
    }

    /// Whether the base name of `path` ends with any configured suffix.
    ///
    /// The comparison is a plain `ends_with` on the file name, so `foo.tar`,
    /// `foo.tar.gz` and `footar` all match `tar`.
    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.0.iter().any(|suffix| name.ends_with(suffix.as_str()))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|s| s.is_empty())
    }
}

impl Default for ArchiveSuffixes {
    fn default() -> Self {
        Self::new(DEFAULT_ARCHIVE_SUFFIXES)
    }
}

/// Classify a path as a directory, an archive or neither.
///
/// Directories win over the suffix check, so a directory called `logs.tar`
/// is still a directory.
pub fn classify(path: &Path, suffixes: &ArchiveSuffixes) -> EntryKind {
    if path.is_dir() {
        EntryKind::Directory
    } else if suffixes.matches(path) {
        EntryKind::Archive
    } else {
        EntryKind::Unrecognized
    }
}

/// Make `path` absolute and fold `.` and `..` components lexically.
///
/// Symlinks are not resolved. An empty path names the current directory.
pub fn expand_path(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.as_os_str().is_empty() {
        std::env::current_dir()?
    } else {
        std::path::absolute(path)?
    };

    let mut expanded = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `pop` refuses to remove the root, so `/..` stays `/`.
                expanded.pop();
            }
            other => expanded.push(other.as_os_str()),
        }
    }
    Ok(expanded)
}

/// A user-supplied path, made absolute and classified once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl Entry {
    pub fn new(path: impl AsRef<Path>, suffixes: &ArchiveSuffixes) -> io::Result<Self> {
        let path = expand_path(path.as_ref())?;
        let kind = classify(&path, suffixes);
        Ok(Self { path, kind })
    }
}
