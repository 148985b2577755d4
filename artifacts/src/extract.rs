//! Archive extraction through an external unarchiver.

use crate::scratch::ScratchSpace;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::{debug, info};

/// Unarchiver invoked when no override is configured
pub const DEFAULT_EXTRACT_COMMAND: &str = "tar";

/// Errors raised while unpacking an archive
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The archive name yields no usable scratch directory name
    #[error("Cannot derive a scratch directory name from '{archive}'")]
    InvalidStem { archive: String },

    /// The scratch directory could not be reset
    #[error("Failed to prepare scratch directory for '{archive}': {reason}")]
    Scratch { archive: String, reason: String },

    /// The unarchiver could not be started
    #[error("Failed to run '{command}' on '{archive}': {reason}")]
    Spawn {
        command: String,
        archive: String,
        reason: String,
    },

    /// The unarchiver exited unsuccessfully
    #[error("Extraction failed: {archive} ({status}) {stderr}")]
    Failed {
        archive: String,
        status: String,
        stderr: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Scratch directory name for an archive: its base name up to the first `.`
///
/// `logs.tar.gz` becomes `logs`. Returns `None` when nothing precedes the
/// first dot.
pub fn archive_stem(archive: &Path) -> Option<String> {
    let name = archive.file_name()?.to_str()?;
    let stem = name.split('.').next().unwrap_or_default();
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

/// Runs an external unarchiver with the scratch directory as working dir
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extractor {
    command: String,
    args: Vec<String>,
}

impl Extractor {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: vec!["xf".to_string()],
        }
    }

    /// Replace the arguments placed before the archive path
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Extract `archive` into a freshly reset scratch subdirectory.
    ///
    /// Blocks until the unarchiver exits. On failure the partially filled
    /// scratch directory is left in place; the next extraction with the same
    /// stem clears it.
    pub fn extract(
        &self,
        archive: &Path,
        scratch: &dyn ScratchSpace,
    ) -> ExtractionResult<PathBuf> {
        let archive = std::path::absolute(archive)?;
        let archive_name = archive.display().to_string();

        let stem = archive_stem(&archive).ok_or_else(|| ExtractionError::InvalidStem {
            archive: archive_name.clone(),
        })?;

        let dir = scratch
            .reset(&stem)
            .map_err(|e| ExtractionError::Scratch {
                archive: archive_name.clone(),
                reason: e.to_string(),
            })?;

        info!("Extracting {} into {}", archive_name, dir.display());

        let output = Command::new(&self.command)
            .args(&self.args)
            .arg(&archive)
            .current_dir(&dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ExtractionError::Spawn {
                command: self.command.clone(),
                archive: archive_name.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ExtractionError::Failed {
                archive: archive_name,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!("Extracted {} into {}", archive_name, dir.display());
        Ok(dir)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(DEFAULT_EXTRACT_COMMAND)
    }
}

/// Immediate subdirectories of an extraction root, sorted by name
pub fn list_suite_dirs(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}
