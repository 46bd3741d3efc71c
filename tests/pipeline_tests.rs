// tests/pipeline_tests.rs - End-to-end scenarios against the library API

use logsift::{
    aggregate, CancellationToken, ExtractionError, ExtractionPipeline, Parser, PipelineConfig,
    StatValue,
};

const HTTP: &str = r"(?P<RequestMethod>GET|POST|PUT|DELETE) (?P<RequestPath>/\S*) (?P<StatusCode>\d{3}) (?P<Elapsed>\d+)ms";

fn http_lines() -> Vec<String> {
    let methods = ["GET", "GET", "POST", "PUT", "DELETE", "GET", "POST", "GET", "PUT", "GET"];
    methods
        .iter()
        .enumerate()
        .map(|(i, m)| format!("{} /api/item/{} {} {}ms", m, i, 200 + i, 10 * (i + 1)))
        .collect()
}

#[test]
fn test_all_lines_match_http_pattern() {
    let pipeline = ExtractionPipeline::new(PipelineConfig::new(vec![HTTP.to_string()]));
    let result = pipeline.extract(&http_lines()).unwrap();

    assert_eq!(result.records.len(), 10);
    assert_eq!(result.processing_efficiency(), 100.0);
    let columns: Vec<&str> = result.columns.iter().map(String::as_str).collect();
    assert_eq!(
        columns,
        vec!["Elapsed", "RequestMethod", "RequestPath", "StatusCode"]
    );
    assert_eq!(result.metric("Elapsed", "min"), Some(&StatValue::Number(10.0)));
    assert_eq!(result.metric("Elapsed", "max"), Some(&StatValue::Number(100.0)));
    assert_eq!(result.metric("Elapsed", "avg"), Some(&StatValue::Number(55.0)));
}

#[test]
fn test_correlation_by_request_method() {
    let lines = [
        "GET /a 200 1ms",
        "GET /b 200 2ms",
        "POST /c 201 3ms",
        "PUT /d 204 4ms",
        "DELETE /e 204 5ms",
    ];
    let config = PipelineConfig::new(vec![HTTP.to_string()]).with_correlation("RequestMethod");
    let result = ExtractionPipeline::new(config).extract(&lines).unwrap();

    assert_eq!(
        result.metric("RequestMethod", "unique_count"),
        Some(&StatValue::Count(4))
    );
    let top = result
        .metric("RequestMethod", "top_values")
        .and_then(StatValue::as_frequencies)
        .unwrap();
    assert_eq!(top["GET"], 2);

    assert_eq!(result.groups.len(), 4);
    let ids: Vec<&str> = result
        .groups
        .iter()
        .map(|g| g.correlation_id.as_str())
        .collect();
    assert_eq!(ids, vec!["DELETE", "GET", "POST", "PUT"]);
}

#[test]
fn test_second_pattern_provenance() {
    let config = PipelineConfig::new(vec![
        r"^ERROR (?P<message>.*)$".to_string(),
        r"^(?P<level>INFO|DEBUG) (?P<message>.*)$".to_string(),
    ]);
    let result = ExtractionPipeline::new(config)
        .extract(&["INFO boot", "DEBUG cache warm", "INFO ready"])
        .unwrap();

    assert_eq!(result.records.len(), 3);
    for record in &result.records {
        assert_eq!(record.pattern_index, 1);
        assert!(record.fields.keys().all(|k| k == "level" || k == "message"));
    }
}

#[test]
fn test_empty_input() {
    let config = PipelineConfig::new(vec![HTTP.to_string()]).with_correlation("RequestMethod");
    let lines: Vec<String> = Vec::new();
    let result = ExtractionPipeline::new(config).extract(&lines).unwrap();

    assert!(result.records.is_empty());
    assert!(result.columns.is_empty());
    assert!(result.groups.is_empty());
    assert_eq!(
        result.stat("processing_efficiency"),
        Some(&StatValue::Number(0.0))
    );
}

#[test]
fn test_blank_lines_never_produce_records() {
    let config = PipelineConfig::new(vec![r"(?P<anything>.*)".to_string()]);
    let result = ExtractionPipeline::new(config)
        .extract(&["", "   ", "\t", "real"])
        .unwrap();

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].line_number, 4);
    assert_eq!(result.processing_efficiency(), 25.0);
}

#[test]
fn test_uncorrelated_records_stay_in_flat_list() {
    let config = PipelineConfig::new(vec![
        r"user=(?P<user>\w+)(?: req=(?P<req>\w+))?".to_string()
    ])
    .with_correlation("req");
    let result = ExtractionPipeline::new(config)
        .extract(&["user=a req=r1", "user=b", "user=c req=r1"])
        .unwrap();

    assert_eq!(result.records.len(), 3);
    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].line_numbers(), vec![1, 3]);
    assert!(result
        .groups
        .iter()
        .all(|g| g.records.iter().all(|r| r.line_number != 2)));
}

#[test]
fn test_bad_pattern_produces_no_partial_output() {
    let config = PipelineConfig::new(vec![HTTP.to_string(), "(?P<open>".to_string()]);
    let err = ExtractionPipeline::new(config)
        .extract(&http_lines())
        .unwrap_err();

    assert!(matches!(err, ExtractionError::InvalidPattern { index: 1, .. }));
    assert!(err.to_string().starts_with("Invalid pattern at index 1"));
}

#[test]
fn test_aggregation_is_idempotent() {
    let parser = Parser::new(&[HTTP]).unwrap();
    let cancel = CancellationToken::new();
    let records = parser.parse(&http_lines(), &cancel).unwrap();

    let first = serde_json::to_vec(&aggregate(&records, &cancel).unwrap().statistics).unwrap();
    let second = serde_json::to_vec(&aggregate(&records, &cancel).unwrap().statistics).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_count_matches_non_empty_values() {
    let config = PipelineConfig::new(vec![r"id=(?P<id>\w*) name=(?P<name>\w*)".to_string()]);
    let result = ExtractionPipeline::new(config)
        .extract(&["id=1 name=x", "id= name=y", "id=1 name="])
        .unwrap();

    assert_eq!(result.metric("id", "count"), Some(&StatValue::Count(2)));
    assert_eq!(result.metric("id", "unique_count"), Some(&StatValue::Count(1)));
    assert_eq!(result.metric("name", "count"), Some(&StatValue::Count(2)));
    assert_eq!(
        result.stat("avg_fields_per_record"),
        Some(&StatValue::Number(1.33))
    );
}

#[test]
fn test_overlapping_column_names_keep_separate_statistics() {
    let config = PipelineConfig::new(vec![r"a=(?P<a>\w+) b=(?P<a_unique>\w+)".to_string()]);
    let result = ExtractionPipeline::new(config)
        .extract(&["a=x b=p", "a=x b=q", "a=x b=r"])
        .unwrap();

    assert_eq!(result.metric("a", "unique_count"), Some(&StatValue::Count(1)));
    assert_eq!(result.metric("a_unique", "count"), Some(&StatValue::Count(3)));
    let metrics: Vec<&str> = result.column_stats("a").map(|(metric, _)| metric).collect();
    assert_eq!(metrics, vec!["count", "unique_count", "top_values"]);
}
