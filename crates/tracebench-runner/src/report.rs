//! Folds a sweep's results into a [`ProfilingReport`].

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracebench_trace::parse_trace_metrics;
use tracebench_types::{
    AggregateMetrics, ExecutionTimeStats, GroupStats, ProfilingReport, RankedGeneration,
    ReportSummary, TestMetricsSummary, TestResult,
};
use tracing::{debug, info};

/// Length of the global slowest-generation ranking.
pub const SLOWEST_GENERATIONS_LIMIT: usize = 5;

/// Build the report with the default ranking length.
pub fn generate_report(results: &[TestResult]) -> ProfilingReport {
    generate_report_with_limit(results, SLOWEST_GENERATIONS_LIMIT)
}

/// Build the report, keeping at most `limit` generations in the ranking.
///
/// Only successful results carrying a trace document contribute metrics.
/// An empty result list yields an all-zero report.
pub fn generate_report_with_limit(results: &[TestResult], limit: usize) -> ProfilingReport {
    let total_tests = results.len();
    let successful_tests = results.iter().filter(|r| r.success).count();
    let summary = ReportSummary {
        total_tests,
        successful_tests,
        failed_tests: total_tests - successful_tests,
        success_rate: percentage(successful_tests, total_tests),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    let mut config_stats: BTreeMap<String, GroupStats> = BTreeMap::new();
    for result in results {
        config_stats
            .entry(result.test_case().group_key())
            .or_default()
            .record(result);
    }

    let trace_metrics: Vec<TestMetricsSummary> = results
        .iter()
        .filter(|r| r.success)
        .filter_map(|r| {
            let metrics = parse_trace_metrics(r.trace_data.as_ref()?)?;
            Some(TestMetricsSummary {
                config: r.config.clone(),
                mode: r.mode.clone(),
                task: r.task_name.clone(),
                run: r.run,
                metrics,
            })
        })
        .collect();
    debug!(
        with_metrics = trace_metrics.len(),
        total = total_tests,
        "Reconciled trace metrics"
    );

    let aggregate = aggregate_metrics(&trace_metrics);
    let slowest_generations = rank_slowest_generations(&trace_metrics, limit);

    info!(
        total = total_tests,
        successful = successful_tests,
        llm_calls = aggregate.total_llm_calls,
        "Report generated"
    );

    ProfilingReport {
        summary,
        config_stats,
        trace_metrics,
        aggregate,
        slowest_generations,
        detailed_results: results.to_vec(),
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

fn aggregate_metrics(summaries: &[TestMetricsSummary]) -> AggregateMetrics {
    AggregateMetrics {
        total_llm_calls: summaries.iter().map(|s| s.metrics.total_llm_calls).sum(),
        total_tokens: summaries.iter().map(|s| s.metrics.total_tokens).sum(),
        total_cost: summaries.iter().map(|s| s.metrics.total_cost).sum(),
        total_generation_time: summaries
            .iter()
            .map(|s| s.metrics.total_generation_time)
            .sum(),
        execution_time: ExecutionTimeStats::from_values(
            summaries.iter().map(|s| s.metrics.full_execution_time),
        ),
    }
}

/// Longest generations across every test. Ties keep report order.
fn rank_slowest_generations(summaries: &[TestMetricsSummary], limit: usize) -> Vec<RankedGeneration> {
    let mut all: Vec<(String, &tracebench_types::ReconciledGeneration)> = summaries
        .iter()
        .flat_map(|s| {
            let info = s.test_info();
            s.metrics
                .generation_timings
                .iter()
                .map(move |g| (info.clone(), g))
        })
        .collect();
    all.sort_by(|a, b| b.1.duration_ms.cmp(&a.1.duration_ms));

    all.into_iter()
        .take(limit)
        .enumerate()
        .map(|(index, (test_info, generation))| RankedGeneration {
            rank: index + 1,
            test_info,
            generation: generation.clone(),
        })
        .collect()
}

/// Serialize the report as pretty JSON, creating parent directories.
pub fn write_report(report: &ProfilingReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    info!(path = %path.display(), "Report written");
    Ok(())
}
