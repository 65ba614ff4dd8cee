//! Tests for the diagnostics channel as seen by downstream crates.

use quire_common::{Diagnostic, DiagnosticId, Diagnostics, Severity};

#[test]
fn test_diagnostics_serialize_with_stable_ids() {
    let mut sink = Diagnostics::new();
    sink.warn(DiagnosticId::RelayoutBudgetExceeded, "4 passes");
    sink.error(DiagnosticId::ResourceFetchFailed, "print.css");

    let json = serde_json::to_value(&sink).expect("diagnostics serialize");
    assert_eq!(json[0]["id"], "relayout-budget-exceeded");
    assert_eq!(json[0]["severity"], "warn");
    assert_eq!(json[1]["id"], "resource-fetch-failed");
    assert_eq!(json[1]["severity"], "error");
}

#[test]
fn test_diagnostics_deserialize_round_trip_preserves_order() {
    let mut sink = Diagnostics::new();
    sink.warn(DiagnosticId::ImportCycle, "a.css -> b.css -> a.css");
    sink.warn(DiagnosticId::MissingGlyph, "U+1F600");

    let text = serde_json::to_string(&sink).expect("serialize");
    let back: Diagnostics = serde_json::from_str(&text).expect("deserialize");
    assert_eq!(back, sink);
    let ids: Vec<DiagnosticId> = back.iter().map(|d| d.id).collect();
    assert_eq!(ids, [DiagnosticId::ImportCycle, DiagnosticId::MissingGlyph]);
}

#[test]
fn test_extend_keeps_reporting_order() {
    let mut first = Diagnostics::new();
    first.warn(DiagnosticId::ContentOverflow, "first");
    let mut second = Diagnostics::new();
    second.push(Diagnostic {
        severity: Severity::Warn,
        id: DiagnosticId::ElementDoesNotFit,
        message: "second".to_string(),
    });
    first.extend(second);

    let messages: Vec<&str> = first.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(messages, ["first", "second"]);
    assert!(!first.has_errors());
}
