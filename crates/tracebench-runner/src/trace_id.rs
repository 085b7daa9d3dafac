//! Recovers the trace id an agent run printed to its log.

use regex::{Regex, RegexBuilder};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Tried in order; the first pattern with a match wins. Matching is
/// case-insensitive and the id is capture group 1.
pub const TRACE_ID_PATTERNS: &[&str] = &[
    r"Langfuse Trace ID:\s*([a-f0-9-]+)",
    r"Initial Langfuse Trace ID:\s*([a-f0-9-]+)",
    r#"trace[_-]?id["']?\s*[:=]\s*["']?([a-f0-9-]+)["']?"#,
];

static COMPILED_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    TRACE_ID_PATTERNS
        .iter()
        .map(|pattern| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .expect("trace id patterns are valid regexes")
        })
        .collect()
});

/// Number of log lines mentioning traces echoed when nothing matched.
const DIAGNOSTIC_LINES: usize = 5;

/// First trace id found in `content`, by pattern priority.
pub fn extract_trace_id(content: &str) -> Option<String> {
    COMPILED_PATTERNS
        .iter()
        .enumerate()
        .find_map(|(index, regex)| {
            let id = regex.captures(content)?.get(1)?.as_str();
            debug!(pattern = index, trace_id = %id, "Trace id matched");
            Some(id.to_string())
        })
}

/// Read the log at `path` and extract a trace id from it.
///
/// A missing or unreadable log yields `None`, never an error.
pub fn extract_trace_id_from_log(path: &Path) -> Option<String> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read log file");
            return None;
        }
    };
    let content = String::from_utf8_lossy(&bytes);

    let found = extract_trace_id(&content);
    if found.is_none() {
        debug!(
            path = %path.display(),
            bytes = bytes.len(),
            "No trace id found in log"
        );
        for line in content
            .lines()
            .filter(|line| {
                let lower = line.to_lowercase();
                lower.contains("langfuse") || lower.contains("trace")
            })
            .take(DIAGNOSTIC_LINES)
        {
            debug!(line = %line.trim(), "Trace-related log line");
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Langfuse Trace ID: abc123-def", Some("abc123-def"))]
    #[case("INFO Initial Langfuse Trace ID:   0f0f-1", Some("0f0f-1"))]
    #[case(r#"{"trace_id": "deadbeef"}"#, Some("deadbeef"))]
    #[case("traceId=cafe-01", Some("cafe-01"))]
    #[case("TRACE-ID: 'abc'", Some("abc"))]
    #[case("langfuse trace id: 42ab", Some("42ab"))]
    #[case("nothing relevant here", None)]
    #[case("", None)]
    fn test_extract_trace_id(#[case] content: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_trace_id(content).as_deref(), expected);
    }

    #[test]
    fn test_first_pattern_wins_over_later_ones() {
        let content = "trace_id=1111\nLangfuse Trace ID: 2222\n";
        assert_eq!(extract_trace_id(content).as_deref(), Some("2222"));
    }

    #[test]
    fn test_first_match_within_pattern_wins() {
        let content = "Langfuse Trace ID: aaaa\nLangfuse Trace ID: bbbb\n";
        assert_eq!(extract_trace_id(content).as_deref(), Some("aaaa"));
    }

    #[test]
    fn test_missing_log_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(extract_trace_id_from_log(&dir.path().join("absent.log")), None);
    }

    #[test]
    fn test_log_file_with_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo_server.log");
        let mut bytes = vec![0xff, 0xfe, b'\n'];
        bytes.extend_from_slice(b"Langfuse Trace ID: 1234-abcd\n");
        fs::write(&path, bytes).unwrap();
        assert_eq!(extract_trace_id_from_log(&path).as_deref(), Some("1234-abcd"));
    }
}
