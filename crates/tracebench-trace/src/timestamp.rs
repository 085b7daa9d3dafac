//! Lenient ISO-8601 timestamp parsing.
//!
//! Backends emit RFC 3339 with `Z` or an explicit offset, but naive timestamps
//! (no offset) show up as well; those are read as UTC. Parsing never fails
//! loudly: anything unreadable is `None`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(raw, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// Parse the string stored under `key` of a map node.
pub fn field_timestamp(node: &Value, key: &str) -> Option<DateTime<Utc>> {
    node.get(key)?.as_str().and_then(parse_timestamp)
}
