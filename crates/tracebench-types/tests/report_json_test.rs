use serde_json::json;
use tracebench_types::{
    ProfilingReport, RankedGeneration, ReconciledGeneration, TestCase, TestMetricsSummary,
    TestResult, TraceMetrics,
};

fn generation() -> ReconciledGeneration {
    ReconciledGeneration {
        id: "g1".to_string(),
        model: "gpt-4o".to_string(),
        tokens: 120,
        cost: 0.002,
        duration_ms: 1500,
        duration_seconds: 1.5,
        node: "planner".to_string(),
        start_time: Some("2024-01-01T00:00:00Z".to_string()),
        end_time: None,
    }
}

#[test]
fn test_metrics_summary_is_flattened() {
    let summary = TestMetricsSummary {
        config: "settings.openai.toml".to_string(),
        mode: "fast".to_string(),
        task: "test_list_my_accounts".to_string(),
        run: 1,
        metrics: TraceMetrics {
            trace_id: "abc".to_string(),
            total_llm_calls: 1,
            ..Default::default()
        },
    };
    let value = serde_json::to_value(&summary).unwrap();
    assert_eq!(value["trace_id"], "abc");
    assert_eq!(value["total_llm_calls"], 1);
    assert_eq!(value["task"], "test_list_my_accounts");
    assert!(value.get("metrics").is_none());
}

#[test]
fn test_ranked_generation_shape() {
    let ranked = RankedGeneration {
        rank: 1,
        test_info: "c | m | t".to_string(),
        generation: generation(),
    };
    let value = serde_json::to_value(&ranked).unwrap();
    assert_eq!(
        value,
        json!({
            "rank": 1,
            "test_info": "c | m | t",
            "id": "g1",
            "model": "gpt-4o",
            "tokens": 120,
            "cost": 0.002,
            "duration_ms": 1500,
            "duration_seconds": 1.5,
            "node": "planner",
            "start_time": "2024-01-01T00:00:00Z",
            "end_time": null
        })
    );
}

#[test]
fn test_report_round_trips_through_json() {
    let mut result = TestResult::pending(&TestCase::new("c", "m", "t", 2));
    result.success = true;
    result.trace_id = Some("abc".to_string());
    result.trace_data = Some(json!({"id": "abc", "observations": []}));

    let report = ProfilingReport {
        detailed_results: vec![result],
        ..Default::default()
    };
    let text = serde_json::to_string_pretty(&report).unwrap();
    let back: ProfilingReport = serde_json::from_str(&text).unwrap();
    assert_eq!(back, report);
    assert_eq!(back.detailed_results[0].task_name, "t");
}
