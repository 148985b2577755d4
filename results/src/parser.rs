//! Results-file parsing.
//!
//! A results file holds blocks of a test-case name line followed by a record
//! line of six whitespace-separated unsigned integers (see
//! [`RESULT_FIELDS`](crate::types::RESULT_FIELDS)). Blank lines are ignored.
//! Parsing is strict: the first malformed line ends the parse with an error
//! naming the file and the 1-based line number.

use crate::types::{CaseRecord, ParsedResults};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, warn};

static RECORD_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]+(?:\s+[0-9]+){5}$").expect("valid record line regex")
});

/// Format violations and read failures for a results file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A record line appeared with no test case waiting for it
    #[error("{path}:{line} Invalid test_results file: result line without a test case")]
    OrphanResult { path: String, line: usize },

    /// A new test case started before the previous one got its record
    #[error("{path}:{line} testcase '{case}' has no results")]
    MissingResult {
        path: String,
        line: usize,
        case: String,
    },

    /// A record line holds a counter too large to represent
    #[error("{path}:{line} counter '{value}' is out of range")]
    InvalidCounter {
        path: String,
        line: usize,
        value: String,
    },

    /// The file could not be read
    #[error("Failed to read results file '{path}': {reason}")]
    Read { path: String, reason: String },
}

impl ParseError {
    /// 1-based line number of the violation, for format errors
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::OrphanResult { line, .. }
            | ParseError::MissingResult { line, .. }
            | ParseError::InvalidCounter { line, .. } => Some(*line),
            ParseError::Read { .. } => None,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Read and parse the results file at `path`
pub fn parse_results_file(path: &Path) -> ParseResult<ParsedResults> {
    let content = fs::read_to_string(path).map_err(|e| ParseError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    parse_results(&content, path)
}

/// Parse results-file text. `path` is used for error messages and to record
/// the directory each case came from.
pub fn parse_results(content: &str, path: &Path) -> ParseResult<ParsedResults> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut results = ParsedResults::new(dir);
    let mut pending: Option<(String, usize)> = None;

    for (index, raw) in content.lines().enumerate() {
        let line_num = index + 1;
        let line = raw.trim();

        if line.is_empty() {
            continue;
        }

        if RECORD_LINE_RE.is_match(line) {
            let Some((case, _)) = pending.take() else {
                return Err(ParseError::OrphanResult {
                    path: path.display().to_string(),
                    line: line_num,
                });
            };
            let fields = parse_fields(line, path, line_num)?;
            results
                .cases
                .insert(case, CaseRecord::from_fields(fields, dir));
        } else {
            if let Some((case, _)) = pending {
                return Err(ParseError::MissingResult {
                    path: path.display().to_string(),
                    line: line_num,
                    case,
                });
            }
            pending = Some((line.to_string(), line_num));
        }
    }

    if let Some((case, line)) = pending {
        warn!(
            "{}:{} testcase '{}' has no results, ignoring it",
            path.display(),
            line,
            case
        );
    }

    debug!("Parsed {} test cases from {}", results.len(), path.display());
    Ok(results)
}

fn parse_fields(line: &str, path: &Path, line_num: usize) -> ParseResult<[u64; 6]> {
    let mut fields = [0u64; 6];
    for (slot, token) in fields.iter_mut().zip(line.split_whitespace()) {
        *slot = token.parse().map_err(|_| ParseError::InvalidCounter {
            path: path.display().to_string(),
            line: line_num,
            value: token.to_string(),
        })?;
    }
    Ok(fields)
}
