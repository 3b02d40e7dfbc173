//! End-to-end CLI run tests
//!
//! Parses real argument lists and drives `run_with` against a fake transport,
//! capturing console output.

use canary_adhoc::cli::dispatch::run_with;
use canary_adhoc::cli::{parse_args, Args, Error, EXIT_FAILURE, EXIT_FATAL};
use canary_adhoc::monitor::TerminalState;
use canary_adhoc::transport::{FakeTransport, TransportError};
use chrono::{TimeZone, Utc};
use std::io::Write;
use tempfile::NamedTempFile;

const DOCUMENT: &str = r#"{
    "scopeName": "checkout",
    "judge": "NetflixACAJudge-v1.0",
    "classifier": { "scoreThresholds": { "marginal": 50, "pass": 75 } },
    "requestThresholds": { "marginal": 50, "pass": 75 },
    "controlScope": { "location": "baseline" },
    "experimentScope": { "location": "canary" },
    "metricGroups": [
        { "groupName": "system", "serviceType": "prometheus", "metricNames": ["cpu", "mem"] }
    ]
}"#;

const JUDGED: &str = r#"{
    "complete": true,
    "status": "succeeded",
    "result": { "judgeResult": {
        "results": [
            { "name": "cpu", "classification": "Pass" },
            { "name": "mem", "classification": "High" }
        ],
        "score": { "score": 50.0, "classification": "Marginal", "classificationReason": "mem regressed" }
    } }
}"#;

fn document() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(DOCUMENT.as_bytes()).unwrap();
    file
}

fn args(config: &NamedTempFile, extra: &[&str]) -> Args {
    let mut argv = vec![
        "canary-adhoc".to_string(),
        "-r".to_string(),
        config.path().display().to_string(),
        "-u".to_string(),
        "http://kayenta:8090/canary".to_string(),
        "--poll-interval-secs".to_string(),
        "0".to_string(),
        "--t0".to_string(),
        "2024-05-01T12:00:00Z".to_string(),
    ];
    argv.extend(extra.iter().map(|s| s.to_string()));
    parse_args(argv).unwrap()
}

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 14, 0, 0).unwrap()
}

#[test]
fn test_full_run_prints_report() {
    let config = document();
    let transport = FakeTransport::new()
        .with_post(r#"{"canaryExecutionId": "01HJOB"}"#)
        .with_get(r#"{"complete": false}"#)
        .with_get(JUDGED);
    let mut out = Vec::new();

    let summary = run_with(&args(&config, &[]), transport, &mut out, now()).unwrap();
    assert_eq!(summary.outcome.state, TerminalState::Completed);

    let text = String::from_utf8(out).unwrap();
    let sending = text.find("sending the adhoc request to the server...").unwrap();
    let waiting = text.find("waiting for the request to complete...").unwrap();
    let logging = text.find("logging the request execution status...").unwrap();
    assert!(sending < waiting && waiting < logging);
    assert!(text.contains("Status URL: http://kayenta:8090/canary/01HJOB\n"));
    assert!(text.contains("Score: 50.0\n"));
    assert!(text.contains("Grade: Marginal\n"));
    assert!(text.contains("Reason: mem regressed\n"));
    assert!(!text.contains("Passed Results Summary"));
    assert!(!text.contains("\"canaryConfig\""));
    assert!(text.ends_with("done.\n"));
}

#[test]
fn test_verbose_run_prints_request_and_breakdown() {
    let config = document();
    let transport = FakeTransport::new()
        .with_post(r#"{"canaryExecutionId": "01HJOB"}"#)
        .with_get(JUDGED);
    let mut out = Vec::new();

    run_with(&args(&config, &["-v"]), transport, &mut out, now()).unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("\"canaryConfig\""));
    assert!(text.contains("\"executionRequest\""));
    let failed = text.find("Failed Results Summary").unwrap();
    assert!(text.find("Name: cpu").unwrap() < failed);
    assert!(text.find("Name: mem").unwrap() > failed);
}

#[test]
fn test_progress_dots_on_stdout() {
    let config = document();
    let transport = FakeTransport::new()
        .with_post(r#"{"canaryExecutionId": "01HJOB"}"#)
        .with_get(r#"{"complete": false}"#);
    let mut out = Vec::new();

    let summary = run_with(
        &args(&config, &["--poll-budget", "4", "--progress-every", "2"]),
        transport,
        &mut out,
        now(),
    )
    .unwrap();
    assert_eq!(summary.outcome.state, TerminalState::TimedOut);

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("waiting for the request to complete...\n..\n"));
    assert!(text.contains("Status: timed out waiting for completion status\n"));
}

#[test]
fn test_submission_failure_is_fatal() {
    let config = document();
    let transport =
        FakeTransport::new().with_post_error(TransportError::Network("refused".to_string()));
    let mut out = Vec::new();

    let err = run_with(&args(&config, &[]), transport, &mut out, now()).unwrap_err();
    assert!(matches!(err, Error::Submission(_)));
    assert_eq!(err.exit_code(), EXIT_FATAL);
    assert!(!String::from_utf8(out).unwrap().contains("waiting"));
}

#[test]
fn test_missing_document_is_fatal() {
    let argv = ["canary-adhoc", "-r", "/nonexistent/adhoc-request.json"];
    let parsed = parse_args(argv.iter().map(|s| s.to_string())).unwrap();
    let mut out = Vec::new();

    let err = run_with(&parsed, FakeTransport::new(), &mut out, now()).unwrap_err();
    assert!(matches!(err, Error::Assembly(_)));
    assert_eq!(err.exit_code(), EXIT_FATAL);
    assert!(out.is_empty());
}

#[test]
fn test_inverted_window_is_fatal() {
    let config = document();
    let transport = FakeTransport::new();
    let mut out = Vec::new();

    let err = run_with(
        &args(&config, &["--t1", "2024-05-01T11:00:00Z"]),
        transport,
        &mut out,
        now(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Assembly(_)));
}

#[test]
fn test_bad_arguments_exit_code() {
    let err = parse_args(["canary-adhoc", "--t0", "soon"].iter().map(|s| s.to_string()))
        .unwrap_err();
    assert_eq!(err.exit_code(), EXIT_FAILURE);
}
