use ascii_tree::{Tree, write_tree};
use std::fmt;
use tracebench_types::{ProfilingReport, TestResult};

/// Renders a `ProfilingReport` as an ASCII tree for the terminal.
///
/// Groups, aggregate trace metrics, the slowest generations and every failed
/// case each get their own branch.
pub fn render_report_as_tree(report: &ProfilingReport) -> Result<String, fmt::Error> {
    let summary = &report.summary;
    let status_icon = if summary.failed_tests == 0 { "✅" } else { "⚠️" };
    let root_label = format!(
        "{} Profiling report: {} tests, {} succeeded ({:.1}%), {} failed",
        status_icon,
        summary.total_tests,
        summary.successful_tests,
        summary.success_rate,
        summary.failed_tests
    );

    let mut sections = vec![render_groups(report)];
    if !report.trace_metrics.is_empty() {
        sections.push(render_aggregate(report));
    }
    if !report.slowest_generations.is_empty() {
        sections.push(render_slowest(report));
    }
    let failures: Vec<&TestResult> = report.detailed_results.iter().filter(|r| !r.success).collect();
    if !failures.is_empty() {
        sections.push(render_failures(&failures));
    }

    let tree = Tree::Node(root_label, sections);
    let mut buffer = String::new();
    write_tree(&mut buffer, &tree)?;
    Ok(buffer)
}

fn render_groups(report: &ProfilingReport) -> Tree {
    let lines = report
        .config_stats
        .iter()
        .map(|(group, stats)| {
            format!(
                "{group}: {}/{} ({:.1}%), avg {:.2}s",
                stats.successful, stats.total, stats.success_rate, stats.avg_time
            )
        })
        .collect::<Vec<_>>();
    if lines.is_empty() {
        return Tree::Node("Configurations".to_string(), vec![]);
    }
    Tree::Node("Configurations".to_string(), vec![Tree::Leaf(lines)])
}

fn render_aggregate(report: &ProfilingReport) -> Tree {
    let aggregate = &report.aggregate;
    let mut lines = vec![
        format!("LLM calls: {}", aggregate.total_llm_calls),
        format!("Tokens: {}", aggregate.total_tokens),
        format!("Cost: ${:.4}", aggregate.total_cost),
        format!("Generation time: {:.2}s", aggregate.total_generation_time),
    ];
    let exec = &aggregate.execution_time;
    if exec.samples > 0 {
        lines.push(format!("Average execution time: {:.2}s", exec.avg));
        lines.push(format!(
            "Execution time range: {:.2}s - {:.2}s",
            exec.min, exec.max
        ));
    }
    Tree::Node(
        format!("Trace metrics ({} tests)", report.trace_metrics.len()),
        vec![Tree::Leaf(lines)],
    )
}

fn render_slowest(report: &ProfilingReport) -> Tree {
    let lines = report
        .slowest_generations
        .iter()
        .map(|ranked| {
            format!(
                "{}. {} [{}] {:.2}s ({})",
                ranked.rank,
                ranked.generation.node,
                ranked.generation.model,
                ranked.generation.duration_seconds,
                ranked.test_info
            )
        })
        .collect();
    Tree::Node(
        format!("Top {} slowest generations", report.slowest_generations.len()),
        vec![Tree::Leaf(lines)],
    )
}

fn render_failures(failures: &[&TestResult]) -> Tree {
    let nodes = failures
        .iter()
        .map(|result| {
            let label = format!("❌ {}", result.test_case());
            let error = result
                .error_message
                .as_deref()
                .unwrap_or("no error message recorded");
            // Only the first line; full output lives in the case log.
            let first_line = error.lines().next().unwrap_or_default();
            Tree::Node(label, vec![Tree::Leaf(vec![first_line.to_string()])])
        })
        .collect();
    Tree::Node("Failures".to_string(), nodes)
}
