//! Run orchestration.
//!
//! Entries are processed strictly in the order given: each one is
//! classified, archives are extracted into the scratch space, and every
//! resulting suite directory is registered under its [`SuiteKey`]. Once all
//! entries are collected the registered suites are parsed, filtered and
//! rendered in registration order.

use crate::config::{ParsePolicy, ReportConfig};
use artifacts::{list_suite_dirs, Entry, EntryKind, ExtractionError, Extractor, ScratchSpace};
use indexmap::IndexMap;
use results::{parse_results_file, select_failed, ParseError, SuiteKey};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Error, Debug)]
pub enum AggregateError {
    /// Entries were given but no suite directory could be registered
    #[error("No {results_file_name} files found!")]
    NoResultsFiles { results_file_name: String },

    #[error("Failed to read entry '{path}': {reason}")]
    Entry { path: String, reason: String },

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Failed to write report: {0}")]
    Output(#[from] io::Error),
}

pub type AggregateResult<T> = Result<T, AggregateError>;

/// A suite directory registered for reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteSource {
    pub key: SuiteKey,
    pub dir: PathBuf,
    pub results_file: PathBuf,
}

/// Suites collected from the entries, in first-registration order
#[derive(Debug, Clone, Default)]
pub struct SuiteRegistry {
    suites: IndexMap<SuiteKey, SuiteSource>,
}

impl SuiteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `dir` as a suite. A suite already registered under the same
    /// key is replaced, keeping its position, and returned.
    pub fn register(&mut self, dir: &Path, results_file_name: &str) -> Option<SuiteSource> {
        let key = SuiteKey::for_dir(dir);
        let source = SuiteSource {
            key: key.clone(),
            dir: dir.to_path_buf(),
            results_file: dir.join(results_file_name),
        };
        debug!("Registering suite {} from {}", key, dir.display());
        let replaced = self.suites.insert(key, source);
        if let Some(old) = &replaced {
            debug!(
                "Suite {} from {} replaces {}",
                old.key,
                dir.display(),
                old.dir.display()
            );
        }
        replaced
    }

    pub fn get(&self, key: &SuiteKey) -> Option<&SuiteSource> {
        self.suites.get(key)
    }

    pub fn len(&self) -> usize {
        self.suites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SuiteSource> {
        self.suites.values()
    }
}

/// What happened to each registered suite during a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Suites with at least one non-passing case
    pub reported: Vec<SuiteKey>,
    /// Suites whose cases all passed cleanly
    pub clean: Vec<SuiteKey>,
    /// Results files that did not exist
    pub missing: Vec<PathBuf>,
    /// Suites skipped under [`ParsePolicy::KeepGoing`]
    pub malformed: Vec<(SuiteKey, ParseError)>,
}

pub struct Aggregator {
    config: ReportConfig,
    scratch: Box<dyn ScratchSpace>,
    extractor: Extractor,
}

impl Aggregator {
    pub fn new(config: ReportConfig, scratch: Box<dyn ScratchSpace>) -> Self {
        let extractor = config.extractor();
        Self {
            config,
            scratch,
            extractor,
        }
    }

    /// Aggregator using the scratch root named by the configuration
    pub fn from_config(config: ReportConfig) -> Self {
        let scratch = Box::new(config.scratch());
        Self::new(config, scratch)
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Classify every entry and register the suite directories it yields
    pub fn collect<P: AsRef<Path>>(&self, entries: &[P]) -> AggregateResult<SuiteRegistry> {
        let mut registry = SuiteRegistry::new();
        let results_file_name = &self.config.results_file_name;

        for raw in entries {
            let raw = raw.as_ref();
            let entry = Entry::new(raw, &self.config.archive_suffixes).map_err(|e| {
                AggregateError::Entry {
                    path: raw.display().to_string(),
                    reason: e.to_string(),
                }
            })?;

            match entry.kind {
                EntryKind::Archive => {
                    let root = self.extractor.extract(&entry.path, self.scratch.as_ref())?;
                    let dirs = list_suite_dirs(&root).map_err(|e| AggregateError::Entry {
                        path: root.display().to_string(),
                        reason: e.to_string(),
                    })?;
                    for dir in dirs {
                        registry.register(&dir, results_file_name);
                    }
                }
                EntryKind::Directory => {
                    registry.register(&entry.path, results_file_name);
                }
                EntryKind::Unrecognized => {
                    warn!(
                        "Skipping {}: neither a directory nor an archive",
                        entry.path.display()
                    );
                }
            }
        }

        Ok(registry)
    }

    /// Collect `entries` and write the report of non-passing suites to `out`
    pub fn run<P: AsRef<Path>>(
        &self,
        entries: &[P],
        out: &mut dyn Write,
    ) -> AggregateResult<RunSummary> {
        let registry = self.collect(entries)?;
        if registry.is_empty() {
            return Err(AggregateError::NoResultsFiles {
                results_file_name: self.config.results_file_name.clone(),
            });
        }

        let mut renderer = self.config.format.renderer();
        let mut summary = RunSummary::default();

        for suite in registry.iter() {
            if !suite.results_file.exists() {
                warn!(
                    "{} file missing: {}",
                    self.config.results_file_name,
                    suite.results_file.display()
                );
                summary.missing.push(suite.results_file.clone());
                continue;
            }

            let parsed = match parse_results_file(&suite.results_file) {
                Ok(parsed) => parsed,
                Err(e) if self.config.parse_policy == ParsePolicy::KeepGoing => {
                    error!("Skipping suite {}: {}", suite.key, e);
                    summary.malformed.push((suite.key.clone(), e));
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let failed = select_failed(&parsed);
            renderer.render_suite(out, &suite.key, &failed)?;
            if failed.is_empty() {
                summary.clean.push(suite.key.clone());
            } else {
                summary.reported.push(suite.key.clone());
            }
        }

        renderer.finish(out)?;
        Ok(summary)
    }
}
