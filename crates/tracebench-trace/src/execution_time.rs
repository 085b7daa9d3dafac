//! Covered execution time of a trace.
//!
//! Observations of every type contribute an interval `[startTime, endTime]`.
//! Intervals are merged (overlapping or touching ones become one) and the
//! merged lengths summed, so concurrent work is counted once and idle gaps
//! between intervals are not counted at all.

use serde_json::Value;
use tracing::debug;

use crate::timestamp::field_timestamp;

/// Half-open span of time in integer units (microseconds for traces).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: i64,
    pub end: i64,
}

impl Interval {
    /// `None` unless `end > start`; degenerate intervals are discarded, not clamped.
    pub fn new(start: i64, end: i64) -> Option<Self> {
        (end > start).then_some(Self { start, end })
    }

    pub fn length(&self) -> i64 {
        self.end - self.start
    }

    /// Interval of an observation in microseconds since the epoch.
    pub fn from_observation(observation: &Value) -> Option<Self> {
        let start = field_timestamp(observation, "startTime")?;
        let end = field_timestamp(observation, "endTime")?;
        Self::new(start.timestamp_micros(), end.timestamp_micros())
    }
}

/// Sort by start and merge in one pass; touching intervals are merged.
pub fn merge_intervals(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.sort_by_key(|interval| interval.start);

    let mut merged = Vec::with_capacity(intervals.len());
    let mut iter = intervals.into_iter();
    let Some(mut current) = iter.next() else {
        return merged;
    };

    for next in iter {
        if next.start <= current.end {
            current.end = current.end.max(next.end);
        } else {
            merged.push(current);
            current = next;
        }
    }
    merged.push(current);
    merged
}

/// Total length covered by the union of `intervals`.
pub fn covered_length(intervals: Vec<Interval>) -> i64 {
    merge_intervals(intervals).iter().map(Interval::length).sum()
}

/// A single trace-level fallback: `Some(seconds)` ends the search.
pub type ExecutionTimeResolver = fn(&Value) -> Option<f64>;

/// Trace-level fallbacks used only when no observation yields a valid interval.
pub const EXECUTION_TIME_FALLBACKS: &[(&str, ExecutionTimeResolver)] = &[
    ("trace_latency", trace_latency),
    ("trace_span", trace_span),
    ("trace_duration", trace_duration),
];

/// Where a trace's execution time came from.
pub const INTERVAL_UNION: &str = "interval_union";
pub const NO_TIMING_DATA: &str = "none";

/// Covered execution time of a trace, in seconds, and the step that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutionTime {
    pub seconds: f64,
    pub source: &'static str,
}

/// Reconcile the covered execution time of `document`.
///
/// `observations` are all observations of the trace regardless of type.
pub fn reconcile_execution_time(document: &Value, observations: &[&Value]) -> ExecutionTime {
    let intervals: Vec<Interval> = observations
        .iter()
        .filter_map(|observation| Interval::from_observation(observation))
        .collect();

    if !intervals.is_empty() {
        let interval_count = intervals.len();
        let micros = covered_length(intervals);
        debug!(
            intervals = interval_count,
            covered_micros = micros,
            "Execution time from interval union"
        );
        return ExecutionTime {
            seconds: micros as f64 / 1_000_000.0,
            source: INTERVAL_UNION,
        };
    }

    EXECUTION_TIME_FALLBACKS
        .iter()
        .find_map(|&(name, resolve)| {
            resolve(document).map(|seconds| ExecutionTime {
                seconds,
                source: name,
            })
        })
        .unwrap_or(ExecutionTime {
            seconds: 0.0,
            source: NO_TIMING_DATA,
        })
}

/// Trace-level `latency` in seconds, when positive.
pub fn trace_latency(document: &Value) -> Option<f64> {
    let latency = document.get("latency")?.as_f64()?;
    (latency > 0.0).then_some(latency)
}

/// Trace-level `endTime - startTime` in seconds.
pub fn trace_span(document: &Value) -> Option<f64> {
    let start = field_timestamp(document, "startTime")?;
    let end = field_timestamp(document, "endTime")?;
    let micros = (end - start).num_microseconds()?;
    Some(micros.max(0) as f64 / 1_000_000.0)
}

/// Trace-level `duration` (milliseconds) in seconds.
pub fn trace_duration(document: &Value) -> Option<f64> {
    let duration = document.get("duration")?.as_f64()?;
    Some(duration / 1000.0)
}
