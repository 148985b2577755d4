use artifacts::{ArchiveSuffixes, Extractor, ScratchDir, DEFAULT_EXTRACT_COMMAND};
use results::ReportFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the scratch root
pub const SCRATCH_DIR_ENV: &str = "QALOG_SCRATCH_DIR";

/// Results file looked up inside every suite directory by default
pub const DEFAULT_RESULTS_FILE_NAME: &str = "test_results";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {reason}")]
    Read { path: String, reason: String },

    #[error("Invalid config file '{path}': {reason}")]
    Parse { path: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// What to do when a results file is malformed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParsePolicy {
    /// Abort the whole run on the first malformed file
    #[default]
    Strict,
    /// Skip the malformed suite and carry on with the rest of the batch
    KeepGoing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub results_file_name: String,
    pub scratch_dir: Option<PathBuf>,
    pub archive_suffixes: ArchiveSuffixes,
    pub extract_command: String,
    pub format: ReportFormat,
    pub parse_policy: ParsePolicy,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            results_file_name: DEFAULT_RESULTS_FILE_NAME.to_string(),
            scratch_dir: None,
            archive_suffixes: ArchiveSuffixes::default(),
            extract_command: DEFAULT_EXTRACT_COMMAND.to_string(),
            format: ReportFormat::Text,
            parse_policy: ParsePolicy::Strict,
        }
    }
}

impl ReportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.display().to_string(),
            reason: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Apply [`SCRATCH_DIR_ENV`] if it is set and non-empty
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(dir) = std::env::var_os(SCRATCH_DIR_ENV).filter(|v| !v.is_empty()) {
            self.scratch_dir = Some(PathBuf::from(dir));
        }
        self
    }

    pub fn with_results_file_name(mut self, name: impl Into<String>) -> Self {
        self.results_file_name = name.into();
        self
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    pub fn with_archive_suffixes(mut self, suffixes: ArchiveSuffixes) -> Self {
        self.archive_suffixes = suffixes;
        self
    }

    pub fn with_extract_command(mut self, command: impl Into<String>) -> Self {
        self.extract_command = command.into();
        self
    }

    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_parse_policy(mut self, policy: ParsePolicy) -> Self {
        self.parse_policy = policy;
        self
    }

    /// Scratch space for extraction, defaulting to the system temp dir
    pub fn scratch(&self) -> ScratchDir {
        self.scratch_dir
            .as_ref()
            .map(ScratchDir::new)
            .unwrap_or_default()
    }

    pub fn extractor(&self) -> Extractor {
        Extractor::new(&self.extract_command)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.results_file_name.trim().is_empty() {
            return Err("Results file name cannot be empty".to_string());
        }

        if self.results_file_name.contains(['/', '\\']) {
            return Err("Results file name must not contain path separators".to_string());
        }

        if self.archive_suffixes.is_empty() {
            return Err("At least one non-empty archive suffix is required".to_string());
        }

        if self.extract_command.trim().is_empty() {
            return Err("Extract command cannot be empty".to_string());
        }

        if let Some(dir) = &self.scratch_dir {
            if dir.as_os_str().is_empty() {
                return Err("Scratch directory cannot be empty".to_string());
            }
        }

        Ok(())
    }
}
