//! Per-observation duration reconciliation.
//!
//! Backends do not always report `duration`; when it is missing or zero the
//! value is derived from the observation's timestamps. Every consumer of a
//! generation's duration goes through [`reconcile_duration_ms`] so that sums
//! and rankings agree.

use serde_json::Value;

use crate::timestamp::field_timestamp;

/// A single step of the duration ladder: `Some(ms)` ends the search.
pub type DurationResolver = fn(&Value) -> Option<u64>;

/// Resolution order for an observation's duration in milliseconds.
pub const DURATION_LADDER: &[(&str, DurationResolver)] = &[
    ("explicit_duration", explicit_duration),
    ("timestamp_delta", timestamp_delta),
];

/// Resolve the duration of one observation in whole milliseconds.
///
/// Never negative; 0 when no step of [`DURATION_LADDER`] can answer.
pub fn reconcile_duration_ms(observation: &Value) -> u64 {
    DURATION_LADDER
        .iter()
        .find_map(|(_, resolve)| resolve(observation))
        .unwrap_or(0)
}

/// Explicit `duration` field, when present and non-zero.
pub fn explicit_duration(observation: &Value) -> Option<u64> {
    let duration = observation.get("duration")?.as_f64()?;
    if duration == 0.0 {
        return None;
    }
    Some(duration.max(0.0).trunc() as u64)
}

/// `endTime - startTime`, truncated to whole milliseconds.
pub fn timestamp_delta(observation: &Value) -> Option<u64> {
    let start = field_timestamp(observation, "startTime")?;
    let end = field_timestamp(observation, "endTime")?;
    let micros = (end - start).num_microseconds()?;
    Some((micros.max(0) / 1_000) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_ladder_order() {
        let names: Vec<_> = DURATION_LADDER.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["explicit_duration", "timestamp_delta"]);
    }

    #[rstest]
    #[case(json!({"duration": 1234}), 1234)]
    #[case(json!({"duration": 12.9}), 12)]
    #[case(json!({"duration": 750, "startTime": "2024-01-01T00:00:00Z", "endTime": "2024-01-01T00:00:05Z"}), 750)]
    #[case(json!({"duration": 0, "startTime": "2024-01-01T00:00:00Z", "endTime": "2024-01-01T00:00:01.5Z"}), 1500)]
    #[case(json!({"startTime": "2024-01-01T00:00:00Z", "endTime": "2024-01-01T00:00:00.0019Z"}), 1)]
    #[case(json!({"duration": null, "startTime": "2024-01-01T00:00:00Z", "endTime": "2024-01-01T00:00:02Z"}), 2000)]
    #[case(json!({"startTime": "2024-01-01T00:00:00Z"}), 0)]
    #[case(json!({"startTime": "garbage", "endTime": "2024-01-01T00:00:02Z"}), 0)]
    #[case(json!({"startTime": "2024-01-01T00:00:05Z", "endTime": "2024-01-01T00:00:02Z"}), 0)]
    #[case(json!({"duration": -40}), 0)]
    #[case(json!({"duration": "1000"}), 0)]
    #[case(json!({}), 0)]
    #[case(json!(null), 0)]
    fn test_reconcile_duration(#[case] observation: Value, #[case] expected: u64) {
        assert_eq!(reconcile_duration_ms(&observation), expected);
    }

    #[test]
    fn test_reconciliation_is_idempotent() {
        let observation = json!({
            "startTime": "2024-01-01T00:00:00.100Z",
            "endTime": "2024-01-01T00:00:03.350Z"
        });
        let first = reconcile_duration_ms(&observation);
        let second = reconcile_duration_ms(&observation);
        assert_eq!(first, 3250);
        assert_eq!(first, second);
    }
}
