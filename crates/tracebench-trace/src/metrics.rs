//! Trace-level metrics aggregation.
//!
//! Combines the locator, the duration reconciler and the execution-time
//! reconciler into a single [`TraceMetrics`] record per trace document.

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::duration::reconcile_duration_ms;
use crate::execution_time::reconcile_execution_time;
use crate::locator::{find_generations, find_observations, observation_type, SPAN_TYPE};
use tracebench_types::{ReconciledGeneration, TraceMetrics};

/// Label used when a field cannot be resolved
pub const UNKNOWN: &str = "unknown";

/// Field path inside an observation, outermost key first.
pub type FieldPath = &'static [&'static str];

/// Model name lookup order.
pub const MODEL_NAME_FIELDS: &[FieldPath] = &[&["model"], &["providedModelName"]];

/// Attribution label lookup order.
pub const NODE_LABEL_FIELDS: &[FieldPath] =
    &[&["metadata", "node"], &["metadata", "langgraph_node"]];

/// Token count lookup order.
pub const TOKEN_FIELDS: &[FieldPath] = &[
    &["usage", "total"],
    &["usage", "totalTokens"],
    &["usageDetails", "total"],
];

/// Monetary cost lookup order.
pub const COST_FIELDS: &[FieldPath] = &[
    &["usage", "totalCost"],
    &["calculatedTotalCost"],
    &["costDetails", "total"],
];

fn lookup<'a>(node: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(node, |current, key| current.get(key))
}

/// First non-empty string along `ladder`.
pub fn resolve_str<'a>(node: &'a Value, ladder: &[FieldPath]) -> Option<&'a str> {
    ladder
        .iter()
        .filter_map(|path| lookup(node, path)?.as_str())
        .find(|value| !value.is_empty())
}

/// First non-negative integer along `ladder`; fractional counts are truncated.
pub fn resolve_u64(node: &Value, ladder: &[FieldPath]) -> Option<u64> {
    ladder.iter().find_map(|path| {
        let value = lookup(node, path)?;
        value
            .as_u64()
            .or_else(|| value.as_f64().filter(|v| *v >= 0.0).map(|v| v as u64))
    })
}

/// First number along `ladder`.
pub fn resolve_f64(node: &Value, ladder: &[FieldPath]) -> Option<f64> {
    ladder
        .iter()
        .find_map(|path| lookup(node, path)?.as_f64())
}

fn optional_string(node: &Value, key: &str) -> Option<String> {
    node.get(key)?.as_str().map(str::to_string)
}

/// Resolve every field of a single generation event.
pub fn reconcile_generation(generation: &Value) -> ReconciledGeneration {
    let duration_ms = reconcile_duration_ms(generation);
    ReconciledGeneration {
        id: optional_string(generation, "id").unwrap_or_default(),
        model: resolve_str(generation, MODEL_NAME_FIELDS)
            .unwrap_or(UNKNOWN)
            .to_string(),
        tokens: resolve_u64(generation, TOKEN_FIELDS).unwrap_or(0),
        cost: resolve_f64(generation, COST_FIELDS).unwrap_or(0.0),
        duration_ms,
        duration_seconds: duration_ms as f64 / 1000.0,
        node: resolve_str(generation, NODE_LABEL_FIELDS)
            .unwrap_or(UNKNOWN)
            .to_string(),
        start_time: optional_string(generation, "startTime"),
        end_time: optional_string(generation, "endTime"),
    }
}

fn is_empty_document(document: &Value) -> bool {
    match document {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => true,
    }
}

/// Build the metrics record for one trace document.
///
/// Returns `None` for a null or empty document: there is nothing to measure,
/// which is not an error.
pub fn parse_trace_metrics(document: &Value) -> Option<TraceMetrics> {
    if is_empty_document(document) {
        return None;
    }

    let trace_id = optional_string(document, "id").unwrap_or_else(|| UNKNOWN.to_string());

    let mut metrics = TraceMetrics {
        trace_id,
        ..Default::default()
    };

    let mut total_generation_ms: u64 = 0;
    for generation in find_generations(document) {
        let reconciled = reconcile_generation(generation);
        total_generation_ms += reconciled.duration_ms;
        metrics.total_tokens += reconciled.tokens;
        metrics.total_cost += reconciled.cost;
        *metrics
            .node_timings
            .entry(reconciled.node.clone())
            .or_insert(0.0) += reconciled.duration_seconds;
        metrics.llm_call_details.push(reconciled);
    }

    metrics.total_llm_calls = metrics.llm_call_details.len();
    metrics.total_generation_time = total_generation_ms as f64 / 1000.0;

    let mut ranked = metrics.llm_call_details.clone();
    ranked.sort_by(|a, b| b.duration_ms.cmp(&a.duration_ms));
    metrics.generation_timings = ranked;

    let observations = find_observations(document);
    metrics.span_timings = span_timings(&observations);

    let execution_time = reconcile_execution_time(document, &observations);
    metrics.full_execution_time = execution_time.seconds;

    debug!(
        trace_id = %metrics.trace_id,
        llm_calls = metrics.total_llm_calls,
        observations = observations.len(),
        execution_time_source = execution_time.source,
        "Parsed trace metrics"
    );

    Some(metrics)
}

fn span_timings(observations: &[&Value]) -> BTreeMap<String, f64> {
    let mut timings = BTreeMap::new();
    for observation in observations {
        if observation_type(observation) != Some(SPAN_TYPE) {
            continue;
        }
        let Some(name) = observation.get("name").and_then(Value::as_str) else {
            continue;
        };
        let duration_ms = reconcile_duration_ms(observation);
        if duration_ms > 0 {
            *timings.entry(name.to_string()).or_insert(0.0) += duration_ms as f64 / 1000.0;
        }
    }
    timings
}
