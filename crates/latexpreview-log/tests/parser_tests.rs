use latexpreview_log::ir::EventPayload;
use latexpreview_log::{LogParser, LogSummary};
use std::fs;
use std::path::Path;

fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {:?}: {}", path, e))
}

#[test]
fn test_undefined_control_sequence() {
    let summary = LogSummary::parse(&fixture("undefined_control.log"));

    assert_eq!(summary.errors.len(), 1);
    let error = &summary.errors[0];
    assert_eq!(error.message, "Undefined control sequence.");
    assert_eq!(error.line, Some(7));
    assert_eq!(error.excerpt.as_deref(), Some("\\fracc"));
    assert_eq!(error.file.as_deref(), Some("./latexpreview.tex"));

    assert_eq!(summary.warnings, vec!["LaTeX Warning: Unused global option(s):"]);
    assert!(summary.missing_files.is_empty());
}

#[test]
fn test_file_stack_is_balanced() {
    let events = LogParser::new().parse(&fixture("undefined_control.log"));

    let entered: Vec<&str> = events
        .iter()
        .filter_map(|e| match &e.payload {
            EventPayload::FileEnter { path } => Some(path.as_str()),
            _ => None,
        })
        .collect();
    let exits = events
        .iter()
        .filter(|e| matches!(e.payload, EventPayload::FileExit))
        .count();

    assert_eq!(entered.len(), 6);
    assert_eq!(entered[0], "./latexpreview.tex");
    assert!(entered.contains(&"./latexpreview.aux"));
    assert_eq!(exits, entered.len());
}

#[test]
fn test_missing_package() {
    let summary = LogSummary::parse(&fixture("missing_package.log"));

    assert_eq!(summary.missing_files, vec!["mathtoolz.sty".to_string()]);
    assert_eq!(summary.errors.len(), 2);
    assert_eq!(
        summary.errors[0].message,
        "LaTeX Error: File `mathtoolz.sty' not found."
    );
    assert_eq!(summary.errors[0].line, None);
    assert_eq!(summary.errors[1].message, "Emergency stop.");
    assert_eq!(summary.errors[1].line, Some(2));
}

#[test]
fn test_spans_point_into_input() {
    let log = fixture("undefined_control.log");
    let events = LogParser::new().parse(&log);

    for event in &events {
        assert!(event.span.start <= event.span.end);
        assert!(event.span.end <= log.len());
    }

    let error = events
        .iter()
        .find(|e| matches!(e.payload, EventPayload::Error { .. }))
        .expect("error event");
    assert_eq!(
        &log[error.span.start..error.span.end],
        "! Undefined control sequence."
    );
}

#[test]
fn test_events_serialize_with_kind_tag() {
    let events = LogParser::new().parse("! Oops.\n");
    let json = serde_json::to_value(&events).unwrap();
    assert_eq!(json[0]["kind"], "Error");
    assert_eq!(json[0]["data"]["message"], "Oops.");
}

#[test]
fn test_empty_log() {
    assert!(LogParser::new().parse("").is_empty());
    assert!(LogSummary::parse("").is_clean());
}
