use std::path::Path;

use gap_core::errors::{ErrorInfo, GapError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("algorithm", "cdrec")
        .with_context("reason", "example")
}

#[test]
fn config_error_is_fatal() {
    let err = GapError::Config(sample_info("gap_algo.folder_conflict", "input equals output"));
    assert_eq!(err.info().code, "gap_algo.folder_conflict");
    assert!(err.info().context.contains_key("algorithm"));
    assert!(err.is_fatal());
}

#[test]
fn execution_error_is_recoverable() {
    let err = GapError::Execution(sample_info("gap_algo.exit_code", "returned code 1"));
    assert!(!err.is_fatal());
}

#[test]
fn environment_error_surface() {
    let err = GapError::Environment(sample_info("gap_exp.replot_missing", "nothing to replot"));
    assert_eq!(err.info().code, "gap_exp.replot_missing");
    assert!(err.is_fatal());
}

#[test]
fn io_helper_records_path() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err = GapError::io("gap_algo.read", Path::new("/tmp/x.txt"), io);
    assert_eq!(err.info().context.get("path").map(String::as_str), Some("/tmp/x.txt"));
}

#[test]
fn display_includes_context_and_hint() {
    let err = GapError::Serde(
        ErrorInfo::new("gap_exp.config_parse", "bad toml")
            .with_context("line", "3")
            .with_hint("check quoting"),
    );
    let rendered = err.to_string();
    assert!(rendered.contains("bad toml (code: gap_exp.config_parse)"));
    assert!(rendered.contains("line=3"));
    assert!(rendered.contains("hint: check quoting"));
}

#[test]
fn errors_roundtrip_through_json() {
    let err = GapError::Config(sample_info("gap_core.unknown_scenario", "nope"));
    let json = serde_json::to_string(&err).expect("encode");
    let back: GapError = serde_json::from_str(&json).expect("decode");
    assert_eq!(err, back);
}
