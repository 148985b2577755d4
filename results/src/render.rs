//! Report rendering.
//!
//! Renderers receive one suite at a time, already filtered down to the cases
//! that did not pass cleanly, and write to any [`io::Write`]. Suites with no
//! remaining cases produce no output at all.

use crate::suite::SuiteKey;
use crate::types::{CaseRecord, ParsedResults, Status};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

const BANNER_WIDTH: usize = 80;
const NAME_WIDTH: usize = 35;
const STATUS_WIDTH: usize = 10;
const TIME_WIDTH: usize = 7;

/// Output format of the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl ReportFormat {
    pub fn renderer(&self) -> Box<dyn ReportRenderer> {
        match self {
            ReportFormat::Text => Box::new(TextReport::new()),
            ReportFormat::Json => Box::new(JsonReport::new()),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!(
                "unknown report format '{}', expected 'text' or 'json'",
                other
            )),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Text => f.write_str("text"),
            ReportFormat::Json => f.write_str("json"),
        }
    }
}

pub trait ReportRenderer {
    /// Render one suite's non-passing cases. Does nothing for an empty suite.
    fn render_suite(
        &mut self,
        out: &mut dyn Write,
        key: &SuiteKey,
        failed: &ParsedResults,
    ) -> io::Result<()>;

    /// Flush anything buffered once every suite has been rendered
    fn finish(&mut self, out: &mut dyn Write) -> io::Result<()>;
}

/// `<results dir basename>/<case>`, the log location shown for a case
pub fn log_path(dir: &Path, case: &str) -> String {
    let base = dir
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_else(|| dir.to_string_lossy());
    format!("{}/{}", base, case)
}

/// Fixed-width text table, one block per suite
#[derive(Debug, Default)]
pub struct TextReport;

impl TextReport {
    pub fn new() -> Self {
        Self
    }

    pub fn banner(key: &SuiteKey) -> String {
        format!(
            "{:=<width$}",
            format!(">> Testsuite: {} ", key),
            width = BANNER_WIDTH
        )
    }

    pub fn header() -> String {
        format!(
            "{:<nw$}{:<sw$}{:<tw$}Log",
            "Test",
            "Status",
            "Time",
            nw = NAME_WIDTH,
            sw = STATUS_WIDTH,
            tw = TIME_WIDTH
        )
    }

    pub fn row(case: &str, record: &CaseRecord) -> String {
        format!(
            "{:<nw$}{:<sw$}{:<tw$}{}",
            case,
            record.status().as_str(),
            record.time,
            log_path(&record.dir, case),
            nw = NAME_WIDTH,
            sw = STATUS_WIDTH,
            tw = TIME_WIDTH
        )
    }
}

impl ReportRenderer for TextReport {
    fn render_suite(
        &mut self,
        out: &mut dyn Write,
        key: &SuiteKey,
        failed: &ParsedResults,
    ) -> io::Result<()> {
        if failed.is_empty() {
            return Ok(());
        }

        writeln!(out, "{}", Self::banner(key))?;
        writeln!(out, "{}", Self::header())?;
        for (case, record) in failed.iter() {
            writeln!(out, "{}", Self::row(case, record))?;
        }
        writeln!(out)
    }

    fn finish(&mut self, out: &mut dyn Write) -> io::Result<()> {
        out.flush()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonSuite {
    pub suite: SuiteKey,
    pub directory: String,
    pub cases: Vec<JsonCase>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonCase {
    pub name: String,
    pub status: Status,
    pub fail: u64,
    pub succeed: u64,
    pub count: u64,
    pub time: u64,
    pub error: u64,
    pub skipped: u64,
    pub log: String,
}

/// JSON array of suites, written once all suites are known
#[derive(Debug, Default)]
pub struct JsonReport {
    suites: Vec<JsonSuite>,
}

impl JsonReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn suites(&self) -> &[JsonSuite] {
        &self.suites
    }
}

impl ReportRenderer for JsonReport {
    fn render_suite(
        &mut self,
        _out: &mut dyn Write,
        key: &SuiteKey,
        failed: &ParsedResults,
    ) -> io::Result<()> {
        if failed.is_empty() {
            return Ok(());
        }

        let cases = failed
            .iter()
            .map(|(name, record)| JsonCase {
                name: name.clone(),
                status: record.status(),
                fail: record.fail,
                succeed: record.succeed,
                count: record.count,
                time: record.time,
                error: record.error,
                skipped: record.skipped,
                log: log_path(&record.dir, name),
            })
            .collect();

        self.suites.push(JsonSuite {
            suite: key.clone(),
            directory: failed.dir().display().to_string(),
            cases,
        });
        Ok(())
    }

    fn finish(&mut self, out: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, &self.suites)?;
        writeln!(out)?;
        out.flush()
    }
}
