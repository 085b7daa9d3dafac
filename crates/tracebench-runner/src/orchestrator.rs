//! Sequential execution of test cases and per-case result assembly.

use crate::cancel::CancellationFlag;
use crate::executor::TaskExecutor;
use crate::trace_id::extract_trace_id_from_log;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracebench_trace::TraceSource;
use tracebench_types::{TestCase, TestResult};
use tracing::{debug, error, info, instrument, warn};

/// Lifecycle of a single test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseState {
    Pending,
    EnvironmentInitialized,
    Executing,
    Succeeded,
    Failed,
    TornDown,
    Finalized,
}

impl fmt::Display for CaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::EnvironmentInitialized => "environment-initialized",
            Self::Executing => "executing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::TornDown => "torn-down",
            Self::Finalized => "finalized",
        };
        f.write_str(name)
    }
}

/// Runs test cases one at a time against a [`TaskExecutor`] and attaches
/// the trace of every case that produced a trace id.
pub struct SweepOrchestrator {
    executor: Arc<dyn TaskExecutor>,
    traces: Arc<dyn TraceSource>,
    require_trace_id: bool,
    cancel: CancellationFlag,
}

impl SweepOrchestrator {
    pub fn new(executor: Arc<dyn TaskExecutor>, traces: Arc<dyn TraceSource>) -> Self {
        Self {
            executor,
            traces,
            require_trace_id: true,
            cancel: CancellationFlag::new(),
        }
    }

    /// Whether a successful run without a trace id counts as a failure.
    pub fn with_require_trace_id(mut self, require: bool) -> Self {
        self.require_trace_id = require;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Execute `cases` in order, one result per case started.
    ///
    /// Stops before the next case once cancellation is requested; results
    /// gathered so far are returned.
    pub async fn run(&self, cases: &[TestCase]) -> Vec<TestResult> {
        let total = cases.len();
        info!(total, "Starting sweep");
        let mut results = Vec::with_capacity(total);

        for (index, case) in cases.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!(
                    completed = results.len(),
                    remaining = total - index,
                    "Sweep cancelled"
                );
                break;
            }
            info!("[{}/{}] {}", index + 1, total, case);
            let result = self.run_single_test(case).await;
            info!(
                "{} {} ({:.2}s)",
                result.status_label(),
                case,
                result.execution_time
            );
            if let Some(message) = &result.error_message {
                info!("   Error: {message}");
            }
            results.push(result);
        }

        results
    }

    /// Run one case through set-up, execution and teardown, then fetch its
    /// trace. Teardown is attempted even when set-up failed. Never fails;
    /// every problem ends up in the returned result.
    #[instrument(skip_all, fields(case = %case))]
    pub async fn run_single_test(&self, case: &TestCase) -> TestResult {
        let started = Instant::now();
        let mut result = TestResult::pending(case);
        transition(CaseState::Pending);

        let env = self.executor.environment(case);
        match self.executor.set_up(&env).await {
            Err(e) => {
                error!(error = %e, "Failed to set up test environment");
                result.error_message = Some(format!("{e:#}"));
            }
            Ok(()) => {
                transition(CaseState::EnvironmentInitialized);
                transition(CaseState::Executing);
                match self.executor.run(&env, case).await {
                    Ok(()) => match extract_trace_id_from_log(&env.log_file) {
                        Some(trace_id) => {
                            debug!(trace_id = %trace_id, "Trace id found");
                            result.trace_id = Some(trace_id);
                            result.success = true;
                        }
                        None if self.require_trace_id => {
                            result.error_message = Some(format!(
                                "Trace ID not found for {} with {} in {} mode",
                                case.task, case.config, case.mode
                            ));
                        }
                        None => {
                            warn!("Task succeeded without reporting a trace id");
                            result.success = true;
                        }
                    },
                    Err(e) => {
                        error!(error = %e, "Task execution failed");
                        result.error_message = Some(format!("{e:#}"));
                    }
                }
            }
        }
        transition(if result.success {
            CaseState::Succeeded
        } else {
            CaseState::Failed
        });

        if let Err(e) = self.executor.tear_down(env).await {
            warn!(error = %e, "Failed to tear down test environment");
        }
        transition(CaseState::TornDown);
        result.execution_time = started.elapsed().as_secs_f64();

        if let Some(trace_id) = &result.trace_id {
            match self.traces.fetch_trace(trace_id).await {
                Ok(document) => result.trace_data = Some(document),
                Err(e) => warn!(trace_id = %trace_id, error = %e, "Failed to fetch trace"),
            }
        }
        transition(CaseState::Finalized);

        result
    }
}

fn transition(state: CaseState) {
    debug!(state = %state, "Test case state");
}
