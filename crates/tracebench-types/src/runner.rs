use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TraceDocument;

/// One point of the sweep: a (config, mode, task) triple plus the repetition
/// number of this execution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TestCase {
    /// Backend provider configuration file, e.g. `settings.openai.toml`
    pub config: String,
    /// Execution mode, e.g. `fast`
    pub mode: String,
    /// Task identifier
    pub task: String,
    /// 1-based repetition number
    pub run: u32,
}

impl TestCase {
    pub fn new(
        config: impl Into<String>,
        mode: impl Into<String>,
        task: impl Into<String>,
        run: u32,
    ) -> Self {
        Self {
            config: config.into(),
            mode: mode.into(),
            task: task.into(),
            run,
        }
    }

    /// Addressable id in `config:mode:task` form
    pub fn test_id(&self) -> String {
        format!("{}:{}:{}", self.config, self.mode, self.task)
    }

    /// Human readable origin label used in rankings
    pub fn label(&self) -> String {
        format!("{} | {} | {}", self.config, self.mode, self.task)
    }

    /// Key of the (config, mode) group this case is reported under
    pub fn group_key(&self) -> String {
        format!("{}_{}", self.config, self.mode)
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (run {})", self.test_id(), self.run)
    }
}

/// Final outcome of one test case execution.
///
/// Created when the case starts and finalized after its environment has been
/// torn down; it is not modified afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestResult {
    pub config: String,
    pub mode: String,
    pub task_name: String,
    pub run: u32,
    pub success: bool,
    /// Wall-clock duration of the whole case in seconds, teardown included
    pub execution_time: f64,
    pub trace_id: Option<String>,
    pub error_message: Option<String>,
    /// Raw trace fetched from the observability backend
    pub trace_data: Option<TraceDocument>,
}

impl TestResult {
    /// Start a result for `case` in the failed state with no trace attached.
    pub fn pending(case: &TestCase) -> Self {
        Self {
            config: case.config.clone(),
            mode: case.mode.clone(),
            task_name: case.task.clone(),
            run: case.run,
            success: false,
            execution_time: 0.0,
            trace_id: None,
            error_message: None,
            trace_data: None,
        }
    }

    pub fn test_case(&self) -> TestCase {
        TestCase::new(&self.config, &self.mode, &self.task_name, self.run)
    }

    /// Human readable status with icon, as printed after each case
    pub fn status_label(&self) -> &'static str {
        if self.success {
            "✅ SUCCESS"
        } else {
            "❌ FAILED"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_identifiers() {
        let case = TestCase::new("settings.openai.toml", "fast", "test_list_my_accounts", 2);
        assert_eq!(case.test_id(), "settings.openai.toml:fast:test_list_my_accounts");
        assert_eq!(case.label(), "settings.openai.toml | fast | test_list_my_accounts");
        assert_eq!(case.group_key(), "settings.openai.toml_fast");
        assert_eq!(
            case.to_string(),
            "settings.openai.toml:fast:test_list_my_accounts (run 2)"
        );
    }

    #[test]
    fn test_pending_result_round_trips_case() {
        let case = TestCase::new("cfg", "balanced", "task", 1);
        let result = TestResult::pending(&case);
        assert!(!result.success);
        assert!(result.trace_id.is_none());
        assert_eq!(result.test_case(), case);
    }
}
