//! Command-line arguments and what an invocation resolves to.

use crate::config::SweepConfig;
use crate::error::SweepError;
use crate::plan::{addressed_cases, list_available_tests, sweep_cases};
use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;
use tracebench_trace::{FetchError, LangfuseConfig};
use tracebench_types::TestCase;

/// Profiles agent tasks across backend configs and modes from their traces.
#[derive(Parser, Debug)]
#[command(name = "tracebench-runner", version, about, long_about = None)]
pub struct Cli {
    /// Comma-separated configs to sweep (default: every known config)
    #[arg(long, value_delimiter = ',')]
    pub configs: Option<Vec<String>>,

    /// Comma-separated modes to sweep (default: every known mode)
    #[arg(long, value_delimiter = ',')]
    pub modes: Option<Vec<String>>,

    /// Comma-separated tasks to sweep (default: every known task)
    #[arg(long, value_delimiter = ',')]
    pub tasks: Option<Vec<String>>,

    /// Repetitions of every selected combination
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub runs: u32,

    /// Write the full JSON report to this file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Run only one combination, as config:mode:task
    #[arg(long)]
    pub test_id: Option<String>,

    /// Print every addressable test id and exit
    #[arg(long)]
    pub list_tests: bool,

    /// YAML file with known configs, modes, tasks and executor settings
    #[arg(long)]
    pub sweep: Option<PathBuf>,
}

/// What to do, decided before any test case runs.
#[derive(Debug)]
pub enum Invocation {
    ListTests(Vec<String>),
    Run {
        langfuse: LangfuseConfig,
        cases: Vec<TestCase>,
    },
}

/// Caller mistakes that end the process with [`UsageError::EXIT_CODE`].
#[derive(Error, Debug)]
pub enum UsageError {
    #[error(transparent)]
    MissingCredentials(#[from] FetchError),

    #[error(transparent)]
    InvalidTestId(#[from] SweepError),
}

impl UsageError {
    pub const EXIT_CODE: u8 = 1;
}

/// Decide what `cli` asks for. Listing needs no credentials; credentials
/// are checked before an addressed test id.
pub fn resolve_invocation<F>(
    cli: &Cli,
    config: &SweepConfig,
    lookup: F,
) -> Result<Invocation, UsageError>
where
    F: Fn(&str) -> Option<String>,
{
    if cli.list_tests {
        return Ok(Invocation::ListTests(list_available_tests(config)));
    }

    let langfuse = LangfuseConfig::from_lookup(lookup)?;

    let cases = match &cli.test_id {
        Some(test_id) => addressed_cases(test_id, config, cli.runs)?,
        None => sweep_cases(
            config,
            cli.configs.as_deref().unwrap_or(&config.configs),
            cli.modes.as_deref().unwrap_or(&config.modes),
            cli.tasks.as_deref().unwrap_or(&config.tasks),
            cli.runs,
        ),
    };

    Ok(Invocation::Run { langfuse, cases })
}
