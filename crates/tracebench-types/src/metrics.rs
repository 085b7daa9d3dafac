use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One inference ("generation") event with every field resolved.
///
/// `duration_ms` is produced by the shared duration reconciler, so the value
/// summed into [`TraceMetrics::total_generation_time`] and the value shown in
/// the ranking are always the same for a given event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReconciledGeneration {
    pub id: String,
    pub model: String,
    pub tokens: u64,
    pub cost: f64,
    pub duration_ms: u64,
    pub duration_seconds: f64,
    /// Attribution label taken from the event metadata
    pub node: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// Metrics reconciled from a single trace document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TraceMetrics {
    pub trace_id: String,
    pub total_llm_calls: usize,
    pub total_tokens: u64,
    pub total_cost: f64,
    /// Attribution label -> summed generation time in seconds
    pub node_timings: BTreeMap<String, f64>,
    /// Named span -> summed span time in seconds
    pub span_timings: BTreeMap<String, f64>,
    /// Generations in document order
    pub llm_call_details: Vec<ReconciledGeneration>,
    /// Sum of all generation durations in seconds.
    ///
    /// Overlapping calls are counted once each.
    pub total_generation_time: f64,
    /// Generations sorted by duration, longest first
    pub generation_timings: Vec<ReconciledGeneration>,
    /// Covered wall-clock time in seconds (union of all observation intervals)
    pub full_execution_time: f64,
}
