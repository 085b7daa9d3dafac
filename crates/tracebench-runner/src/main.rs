use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracebench_runner::config::LOG_PATH_ENV;
use tracebench_runner::renderer::render_report_as_tree;
use tracebench_runner::{
    CancellationFlag, Cli, Invocation, ProcessTaskExecutor, SweepConfig, SweepOrchestrator,
    UsageError, generate_report, resolve_invocation, write_report,
};
use tracebench_trace::LangfuseClient;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_LOG_FILTER: &str = "info,tracebench_runner=debug,tracebench_trace=debug";

fn init_tracing() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init()
        .context("Failed to set global default tracing subscriber")
}

fn print_available_tests(ids: &[String]) {
    println!("Available test IDs:");
    println!("{}", "=".repeat(50));
    for (i, id) in ids.iter().enumerate() {
        println!("{:2}. {id}", i + 1);
    }
    println!("\nTotal: {} test combinations", ids.len());
    let example = ids.first().map(String::as_str).unwrap_or("config:mode:task");
    println!("\nUsage example:");
    println!("  tracebench-runner --test-id {example}");
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenv().ok();
    init_tracing()?;
    let cli = Cli::parse();

    let mut config = match &cli.sweep {
        Some(path) => SweepConfig::load(path)
            .with_context(|| format!("Failed to load sweep file {}", path.display()))?,
        None => SweepConfig::default(),
    };
    if let Ok(log_root) = std::env::var(LOG_PATH_ENV) {
        config.executor.log_root = PathBuf::from(log_root);
    }

    let (langfuse, cases) = match resolve_invocation(&cli, &config, |name| std::env::var(name).ok()) {
        Ok(Invocation::ListTests(ids)) => {
            print_available_tests(&ids);
            return Ok(ExitCode::SUCCESS);
        }
        Ok(Invocation::Run { langfuse, cases }) => (langfuse, cases),
        Err(e) => {
            eprintln!("Error: {e}");
            if matches!(e, UsageError::InvalidTestId(_)) {
                eprintln!("Expected format: config:mode:task");
                eprintln!("Use --list-tests to see every available test id");
            }
            return Ok(ExitCode::from(UsageError::EXIT_CODE));
        }
    };
    if cases.is_empty() {
        warn!("Nothing to run for the given selection");
    }

    let client = LangfuseClient::new(langfuse).context("Failed to build trace client")?;
    let cancel = CancellationFlag::new();
    cancel.cancel_on_ctrl_c();

    let orchestrator = SweepOrchestrator::new(
        Arc::new(ProcessTaskExecutor::new(config.executor.clone())),
        Arc::new(client),
    )
    .with_require_trace_id(config.require_trace_id)
    .with_cancellation(cancel);

    let results = orchestrator.run(&cases).await;
    let report = generate_report(&results);

    println!("\n{}", render_report_as_tree(&report)?);

    if let Some(path) = &cli.output {
        write_report(&report, path)?;
        println!("Detailed report saved to: {}", path.display());
    }
    info!("Profiling completed");

    Ok(ExitCode::SUCCESS)
}
