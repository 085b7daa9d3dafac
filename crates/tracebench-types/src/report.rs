use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{ReconciledGeneration, TestResult, TraceMetrics};

/// Comparative report over every result of a sweep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProfilingReport {
    pub summary: ReportSummary,
    /// Keyed by `"{config}_{mode}"`
    pub config_stats: BTreeMap<String, GroupStats>,
    pub trace_metrics: Vec<TestMetricsSummary>,
    pub aggregate: AggregateMetrics,
    pub slowest_generations: Vec<RankedGeneration>,
    pub detailed_results: Vec<TestResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ReportSummary {
    pub total_tests: usize,
    pub successful_tests: usize,
    pub failed_tests: usize,
    /// Percentage, 0.0 when there are no tests
    pub success_rate: f64,
    pub timestamp: String,
}

/// Success and timing statistics for one (config, mode) group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GroupStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub total_time: f64,
    pub avg_time: f64,
    pub success_rate: f64,
}

impl GroupStats {
    /// Account for one more result of this group.
    pub fn record(&mut self, result: &TestResult) {
        self.total += 1;
        if result.success {
            self.successful += 1;
        } else {
            self.failed += 1;
        }
        self.total_time += result.execution_time;
        self.refresh_rates();
    }

    fn refresh_rates(&mut self) {
        if self.total == 0 {
            self.avg_time = 0.0;
            self.success_rate = 0.0;
            return;
        }
        self.avg_time = self.total_time / self.total as f64;
        self.success_rate = self.successful as f64 / self.total as f64 * 100.0;
    }
}

/// Metrics of one test, tagged with where they came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestMetricsSummary {
    pub config: String,
    pub mode: String,
    pub task: String,
    pub run: u32,
    #[serde(flatten)]
    pub metrics: TraceMetrics,
}

impl TestMetricsSummary {
    pub fn test_info(&self) -> String {
        format!("{} | {} | {}", self.config, self.mode, self.task)
    }
}

/// Global sums over every test with usable metrics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AggregateMetrics {
    pub total_llm_calls: usize,
    pub total_tokens: u64,
    pub total_cost: f64,
    pub total_generation_time: f64,
    pub execution_time: ExecutionTimeStats,
}

/// Distribution of `full_execution_time` over tests where it is positive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ExecutionTimeStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    /// Number of tests that contributed to the distribution
    pub samples: usize,
}

impl ExecutionTimeStats {
    /// Build the distribution from raw values, ignoring zero and negative ones.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let usable: Vec<f64> = values.into_iter().filter(|v| *v > 0.0).collect();
        if usable.is_empty() {
            return Self::default();
        }
        let min = usable.iter().copied().fold(f64::INFINITY, f64::min);
        let max = usable.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = usable.iter().sum::<f64>() / usable.len() as f64;
        Self {
            min,
            max,
            avg,
            samples: usable.len(),
        }
    }
}

/// A generation placed in the global slowest-first ranking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedGeneration {
    pub rank: usize,
    /// `"{config} | {mode} | {task}"` of the originating test
    pub test_info: String,
    #[serde(flatten)]
    pub generation: ReconciledGeneration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TestCase;

    #[test]
    fn test_execution_time_stats_skip_zero_values() {
        let stats = ExecutionTimeStats::from_values([0.0, 4.0, 6.0]);
        assert_eq!(stats.samples, 2);
        assert_eq!(stats.avg, 5.0);
        assert_eq!(stats.min, 4.0);
        assert_eq!(stats.max, 6.0);
    }

    #[test]
    fn test_execution_time_stats_empty() {
        let stats = ExecutionTimeStats::from_values([0.0, 0.0]);
        assert_eq!(stats, ExecutionTimeStats::default());
    }

    #[test]
    fn test_group_stats_record() {
        let case = TestCase::new("cfg", "fast", "task", 1);
        let mut ok = TestResult::pending(&case);
        ok.success = true;
        ok.execution_time = 3.0;
        let mut failed = TestResult::pending(&case);
        failed.execution_time = 1.0;

        let mut stats = GroupStats::default();
        stats.record(&ok);
        stats.record(&failed);

        assert_eq!(stats.total, 2);
        assert_eq!(stats.successful, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.avg_time, 2.0);
        assert_eq!(stats.success_rate, 50.0);
    }
}
