pub mod parser;
pub mod render;
pub mod select;
pub mod suite;
pub mod types;

pub use parser::{parse_results, parse_results_file, ParseError, ParseResult};
pub use render::{JsonReport, ReportFormat, ReportRenderer, TextReport};
pub use select::select_failed;
pub use suite::{resolve_suite_name, SuiteKey};
pub use types::{CaseRecord, ParsedResults, Status, RESULT_FIELDS};

pub mod prelude {
    pub use crate::parser::*;
    pub use crate::render::*;
    pub use crate::select::*;
    pub use crate::suite::*;
    pub use crate::types::*;
}
