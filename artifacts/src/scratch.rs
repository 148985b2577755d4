//! Scratch space for archive extraction.
//!
//! The extractor never touches a fixed global path. Callers hand it a
//! [`ScratchSpace`], so tests can point extraction at an isolated temporary
//! root. Within one root, a subdirectory is keyed by archive stem and reset
//! (remove, then create) before every extraction: repeated runs are
//! idempotent, but two archives sharing a stem must not be extracted at the
//! same time.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A place where extraction roots can be (re)created by name
pub trait ScratchSpace {
    /// Root under which named subdirectories are created
    fn root(&self) -> &Path;

    /// Remove any existing subdirectory called `name`, recreate it empty and
    /// return its absolute path.
    fn reset(&self, name: &str) -> io::Result<PathBuf>;
}

/// Scratch space backed by a directory on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Scratch space in the system temporary directory
    pub fn system() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl Default for ScratchDir {
    fn default() -> Self {
        Self::system()
    }
}

impl ScratchSpace for ScratchDir {
    fn root(&self) -> &Path {
        &self.root
    }

    fn reset(&self, name: &str) -> io::Result<PathBuf> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' is not a valid scratch directory name", name),
            ));
        }

        let dir = std::path::absolute(self.root.join(name))?;
        if dir.exists() {
            debug!("Removing stale scratch directory {}", dir.display());
            fs::remove_dir_all(&dir)?;
        }
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
