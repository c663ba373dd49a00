//! Run-level validation: the three-stage check against a run's own
//! `log_schema`.

use logschema_core::{
    LogFormat, LogSchema, RunLog, RunResponse, ValidationLevel, Validator, RUN_SCHEMA_MISSING,
};

const VALID_RO_CRATE: &str = r#"{
    "@context": "https://w3id.org/ro/crate/1.1/context",
    "@graph": [
        {"@id": "./", "@type": "Dataset"}
    ]
}"#;

fn ro_crate_schema() -> LogSchema {
    LogSchema::new("https://w3id.org/ro/crate/1.1").with_format(LogFormat::RoCrate)
}

fn opm_schema() -> LogSchema {
    LogSchema::new("https://www.w3.org/TR/prov-o/").with_format(LogFormat::Opm)
}

#[test]
fn no_structured_log_returns_none() {
    let run = RunLog {
        stdout: Some("plain text log".to_string()),
        ..RunLog::default()
    };
    assert!(Validator::new().validate_run(&run).is_none());
}

#[test]
fn empty_structured_log_returns_none() {
    let run = RunLog::new("empty")
        .with_structured_log("")
        .with_log_schema(ro_crate_schema());
    assert!(Validator::new().validate_run(&run).is_none());
}

#[test]
fn structured_log_without_schema_is_soft_failure() {
    let run = RunLog::new("no-schema").with_structured_log(r#"{"wasGeneratedBy": {}}"#);
    let outcome = Validator::new().validate_run(&run).expect("outcome");

    assert!(!outcome.valid);
    assert_eq!(outcome.level, ValidationLevel::Run);
    assert_eq!(outcome.format, None);
    assert_eq!(outcome.errors, vec![RUN_SCHEMA_MISSING.to_string()]);
}

#[test]
fn valid_ro_crate_passes() {
    let run = RunLog::new("variant-calling-pipeline")
        .with_structured_log(VALID_RO_CRATE)
        .with_log_schema(ro_crate_schema().with_media_type("application/ld+json"));
    let outcome = Validator::new().validate_run(&run).expect("outcome");

    assert!(outcome.valid, "unexpected errors: {:?}", outcome.errors);
    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.format, Some(LogFormat::RoCrate));
}

#[test]
fn ro_crate_missing_graph_names_graph() {
    let run = RunLog::new("r")
        .with_structured_log(r#"{"@context": "https://w3id.org/ro/crate/1.1/context"}"#)
        .with_log_schema(ro_crate_schema());
    let outcome = Validator::new().validate_run(&run).expect("outcome");

    assert!(!outcome.valid);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("'@graph'"));
    assert!(!outcome.errors[0].contains("'@context'"));
}

#[test]
fn ro_crate_missing_context_names_context() {
    let run = RunLog::new("r")
        .with_structured_log(r#"{"@graph": []}"#)
        .with_log_schema(ro_crate_schema());
    let outcome = Validator::new().validate_run(&run).expect("outcome");

    assert!(!outcome.valid);
    assert!(outcome.errors[0].contains("'@context'"));
}

#[test]
fn opm_with_any_single_prov_key_passes() {
    for key in logschema_core::PROV_KEYS {
        let run = RunLog::new("genomic-alignment")
            .with_structured_log(format!(r#"{{"{}": {{"id": "run-001"}}}}"#, key))
            .with_log_schema(opm_schema());
        let outcome = Validator::new().validate_run(&run).expect("outcome");
        assert!(outcome.valid, "key {key}: {:?}", outcome.errors);
    }
}

#[test]
fn opm_without_prov_keys_fails() {
    let run = RunLog::new("r")
        .with_structured_log(r#"{"id": "run-001", "steps": []}"#)
        .with_log_schema(opm_schema());
    let outcome = Validator::new().validate_run(&run).expect("outcome");

    assert!(!outcome.valid);
    assert!(outcome.errors[0].starts_with("format validation failed: no W3C PROV keys found"));
}

#[test]
fn malformed_json_is_reported_not_raised() {
    let run = RunLog::new("r")
        .with_structured_log("{not valid json")
        .with_log_schema(opm_schema());
    let outcome = Validator::new().validate_run(&run).expect("outcome");

    assert!(!outcome.valid);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("not valid JSON"));
    assert!(outcome.errors[0].contains("application/json"));
}

#[test]
fn uri_structured_log_skips_structural_checks() {
    let run = RunLog::new("r")
        .with_structured_log("https://storage.example.com/logs/structured.json")
        .with_log_schema(ro_crate_schema());
    let outcome = Validator::new().validate_run(&run).expect("outcome");

    assert!(outcome.valid, "unexpected errors: {:?}", outcome.errors);
}

#[test]
fn uri_structured_log_still_requires_valid_descriptor() {
    let run = RunLog::new("r")
        .with_structured_log("https://storage.example.com/logs/structured.json")
        .with_log_schema(LogSchema::new("file:///schemas/ro-crate.json"));
    let outcome = Validator::new().validate_run(&run).expect("outcome");

    assert!(!outcome.valid);
    assert!(outcome.errors[0].starts_with("invalid log_schema:"));
}

#[test]
fn broken_uri_content_is_checked_as_inline() {
    let run = RunLog::new("r")
        .with_structured_log("https://bad host/{")
        .with_log_schema(ro_crate_schema());
    let outcome = Validator::new().validate_run(&run).expect("outcome");

    assert!(!outcome.valid);
    assert!(outcome.errors[0].contains("not valid JSON"));
}

#[test]
fn json_schema_and_custom_only_check_syntax() {
    for format in [LogFormat::JsonSchema, LogFormat::Custom] {
        let run = RunLog::new("r")
            .with_structured_log("[1, 2, 3]")
            .with_log_schema(LogSchema::new("https://example.com/schema").with_format(format));
        let outcome = Validator::new().validate_run(&run).expect("outcome");
        assert!(outcome.valid);
    }
}

#[test]
fn unknown_format_fails_descriptor_stage() {
    let run = RunLog::new("r")
        .with_structured_log(VALID_RO_CRATE)
        .with_log_schema(LogSchema::new("https://example.com/schema").with_format("cwlprov"));
    let outcome = Validator::new().validate_run(&run).expect("outcome");

    assert!(!outcome.valid);
    assert!(outcome.errors[0].contains("\"cwlprov\" is not a recognised value"));
    assert_eq!(
        outcome.format,
        Some(LogFormat::Unrecognized("cwlprov".to_string()))
    );
}

#[test]
fn run_parsed_from_wire_json_validates() {
    let raw = serde_json::json!({
        "name": "example-workflow",
        "start_time": "2024-01-01T10:00:00Z",
        "end_time": "2024-01-01T12:00:00Z",
        "exit_code": 0,
        "stdout": "https://storage.example.com/stdout.txt",
        "structured_log": "{\"@context\":\"https://w3id.org/ro/crate/1.1/context\",\"@graph\":[]}",
        "log_schema": {
            "schema_uri": "https://w3id.org/ro/crate/1.1",
            "format": "ro-crate",
            "media_type": "application/ld+json",
            "schema_version": "1.1"
        }
    });
    let run: RunLog = serde_json::from_value(raw).expect("parse run");
    let outcome = Validator::new().validate_run(&run).expect("outcome");
    assert!(outcome.valid, "unexpected errors: {:?}", outcome.errors);
}

#[test]
fn loose_timestamps_do_not_block_validation() {
    for start_time in ["", "2024-01-01 10:00:00", "2024-01-01", "yesterday"] {
        let raw = serde_json::json!({
            "run_id": "run-ts",
            "run_log": {
                "name": "timestamps",
                "start_time": start_time,
                "end_time": "",
                "structured_log": "{\"used\": {}}",
                "log_schema": { "schema_uri": "https://www.w3.org/TR/prov-o/", "format": "opm" }
            },
            "task_logs": [{ "start_time": start_time, "logs": [{ "end_time": start_time }] }]
        })
        .to_string();

        let doc = RunResponse::from_json(&raw)
            .unwrap_or_else(|e| panic!("start_time {:?} rejected: {}", start_time, e));
        assert_eq!(doc.run_log.start_time.as_deref(), Some(start_time));
        assert_eq!(doc.task_logs[0].logs[0].end_time.as_deref(), Some(start_time));

        let outcome = Validator::new().validate_run(&doc.run_log).expect("outcome");
        assert!(outcome.valid, "unexpected errors: {:?}", outcome.errors);
    }
}

#[test]
fn concurrent_validation_is_independent() {
    let validator = Validator::new();
    let good = RunLog::new("good")
        .with_structured_log(VALID_RO_CRATE)
        .with_log_schema(ro_crate_schema());
    let bad = RunLog::new("bad")
        .with_structured_log("{oops")
        .with_log_schema(ro_crate_schema());

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let run = if i % 2 == 0 { &good } else { &bad };
                scope.spawn(move || (i, validator.validate_run(run).expect("outcome").valid))
            })
            .collect();
        for handle in handles {
            let (i, valid) = handle.join().expect("thread");
            assert_eq!(valid, i % 2 == 0);
        }
    });
}
