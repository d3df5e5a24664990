use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_diagnostic_builder() {
    let diag = Diagnostic::compatibility(Span::new(0, 5), "argument 1 has type string, expected i32")
        .with_label(Span::new(10, 12), "parameter declared here")
        .with_note("some context");

    assert_eq!(diag.kind, DiagnosticKind::Compatibility);
    assert_eq!(diag.span, Span::new(0, 5));
    assert_eq!(diag.labels.len(), 1);
    assert_eq!(diag.notes, vec!["some context".to_string()]);
    assert!(diag.mentions("expected i32"));
}

#[test]
fn test_diagnostic_display() {
    let diag = Diagnostic::obligation(Span::new(3, 9), "constraint on T is not satisfied")
        .with_note("via method set");

    let output = diag.to_string();
    assert!(output.contains("error[obligation]"));
    assert!(output.contains("3..9"));
    assert!(output.contains("= note: via method set"));
}

#[test]
fn test_sort_by_position() {
    let mut diags = vec![
        Diagnostic::reference(Span::new(20, 21), "b"),
        Diagnostic::arity(Span::new(1, 2), "z"),
        Diagnostic::arity(Span::new(1, 2), "a"),
    ];
    sort_by_position(&mut diags);

    let order: Vec<_> = diags.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(order, vec!["a", "z", "b"]);
}

#[test]
fn test_kind_names_are_distinct() {
    let mut names: Vec<_> = DiagnosticKind::ALL.iter().map(|k| k.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), DiagnosticKind::ALL.len());
}
