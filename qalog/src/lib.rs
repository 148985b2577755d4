pub mod aggregate;
pub mod config;

pub use aggregate::{
    AggregateError, AggregateResult, Aggregator, RunSummary, SuiteRegistry, SuiteSource,
};
pub use config::{
    ConfigError, ParsePolicy, ReportConfig, DEFAULT_RESULTS_FILE_NAME, SCRATCH_DIR_ENV,
};
