//! # Tracebench Runner
//!
//! Drives a sweep of agent task executions over (config, mode, task, run),
//! recovers each execution's trace id from its log, fetches the trace and
//! folds everything into a comparative [`ProfilingReport`].

pub mod cancel;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod orchestrator;
pub mod plan;
pub mod renderer;
pub mod report;
pub mod trace_id;

pub use cancel::CancellationFlag;
pub use cli::{Cli, Invocation, UsageError, resolve_invocation};
pub use config::{ExecutorConfig, SweepConfig};
pub use error::{ConfigError, SweepError};
pub use executor::{ProcessTaskExecutor, TaskExecutor, TestEnvironment};
pub use orchestrator::SweepOrchestrator;
pub use plan::{addressed_cases, list_available_tests, parse_test_id, sweep_cases};
pub use report::{generate_report, write_report};
pub use trace_id::{extract_trace_id, extract_trace_id_from_log};

pub use tracebench_types::{ProfilingReport, TestCase, TestResult};
