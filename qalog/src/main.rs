use clap::{CommandFactory, Parser};
use qalog::{Aggregator, ConfigError, ParsePolicy, ReportConfig};
use results::ReportFormat;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Exit status when no entries are given
const USAGE_EXIT_CODE: u8 = 255;

/// Minimum level for the orchestrator, whatever `RUST_LOG` says
const DIAGNOSTICS_DIRECTIVE: &str = "qalog::aggregate=warn";

#[derive(Parser)]
#[command(name = "qalog")]
#[command(about = "Report the non-passing suites of QA test runs")]
#[command(
    after_help = "Each ENTRY can be a directory or tarball.\nIf it's a tarball, extract it to a temporary directory before analyzing.\n\nLogs go to stderr, filtered by RUST_LOG (default: warn). Missing results files\nare always reported."
)]
struct Cli {
    /// Suite directories or archives of suite directories
    #[arg(value_name = "ENTRY")]
    entries: Vec<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory where archives are extracted
    #[arg(long)]
    scratch_dir: Option<PathBuf>,

    /// Name of the results file inside each suite directory
    #[arg(long)]
    results_file: Option<String>,

    /// Report format (text or json)
    #[arg(short, long)]
    format: Option<ReportFormat>,

    /// Skip suites with malformed results files instead of aborting
    #[arg(long)]
    keep_going: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(log_filter())
        .init();

    let cli = Cli::parse();

    if cli.entries.is_empty() {
        // Help goes to stdout, like the report.
        if let Err(e) = print_usage() {
            error!("Failed to print usage: {}", e);
        }
        return ExitCode::from(USAGE_EXIT_CODE);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Fatal Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG`, defaulting to `warn`. Orchestration warnings (missing results
/// files, skipped entries) stay visible even under a stricter filter.
fn log_filter() -> EnvFilter {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    match DIAGNOSTICS_DIRECTIVE.parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

fn print_usage() -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "{}", Cli::command().render_help())?;
    writeln!(stdout)?;
    stdout.flush()
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&cli)?;
    debug!("Using configuration {:?}", config);

    let aggregator = Aggregator::from_config(config);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = aggregator.run(&cli.entries, &mut out)?;

    debug!(
        "{} suites reported, {} clean, {} missing, {} malformed",
        summary.reported.len(),
        summary.clean.len(),
        summary.missing.len(),
        summary.malformed.len()
    );
    Ok(())
}

/// Defaults, then the config file, then the environment, then flags
fn build_config(cli: &Cli) -> Result<ReportConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => ReportConfig::load(path)?,
        None => ReportConfig::default(),
    }
    .with_env_overrides();

    if let Some(dir) = &cli.scratch_dir {
        config = config.with_scratch_dir(dir);
    }
    if let Some(name) = &cli.results_file {
        config = config.with_results_file_name(name);
    }
    if let Some(format) = cli.format {
        config = config.with_format(format);
    }
    if cli.keep_going {
        config = config.with_parse_policy(ParsePolicy::KeepGoing);
    }

    config.validate().map_err(ConfigError::Invalid)?;
    Ok(config)
}
