use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Field order of a record line in a results file
pub const RESULT_FIELDS: [&str; 6] = ["fail", "succeed", "count", "time", "error", "skipped"];

/// Counters recorded for one test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub fail: u64,
    pub succeed: u64,
    pub count: u64,
    pub time: u64,
    pub error: u64,
    pub skipped: u64,
    /// Directory holding the results file this record came from
    pub dir: PathBuf,
}

impl CaseRecord {
    /// Build a record from counters in [`RESULT_FIELDS`] order
    pub fn from_fields(fields: [u64; 6], dir: impl Into<PathBuf>) -> Self {
        let [fail, succeed, count, time, error, skipped] = fields;
        Self {
            fail,
            succeed,
            count,
            time,
            error,
            skipped,
            dir: dir.into(),
        }
    }

    pub fn fields(&self) -> [u64; 6] {
        [
            self.fail,
            self.succeed,
            self.count,
            self.time,
            self.error,
            self.skipped,
        ]
    }

    /// Every test succeeded and nothing failed, errored or was skipped
    pub fn is_clean_pass(&self) -> bool {
        self.succeed == self.count && self.fail == 0 && self.error == 0 && self.skipped == 0
    }

    pub fn status(&self) -> Status {
        Status::from_record(self)
    }
}

/// Outcome label shown in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Fail,
    Error,
    Skipped,
    Pass,
}

impl Status {
    /// First match wins: fail, error, skipped, then a clean count is a pass.
    /// A record with zeroed failure counters whose succeeded count differs
    /// from its total is an error.
    pub fn from_record(record: &CaseRecord) -> Self {
        if record.fail != 0 {
            Status::Fail
        } else if record.error != 0 {
            Status::Error
        } else if record.skipped != 0 {
            Status::Skipped
        } else if record.succeed == record.count {
            Status::Pass
        } else {
            Status::Error
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Fail => "FAIL",
            Status::Error => "ERROR",
            Status::Skipped => "SKIPPED",
            Status::Pass => "PASS",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All records parsed from one results file, in file order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParsedResults {
    /// Directory holding the results file
    pub dir: PathBuf,
    pub cases: IndexMap<String, CaseRecord>,
}

impl ParsedResults {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cases: IndexMap::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn get(&self, case: &str) -> Option<&CaseRecord> {
        self.cases.get(case)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CaseRecord)> {
        self.cases.iter()
    }
}
