use quill_core::{ReviewIssue, Severity};
use quill_review::pipeline::filter_issues_by_severity;

fn issue(severity: Severity, message: &str) -> ReviewIssue {
    ReviewIssue {
        severity,
        message: message.into(),
        match_text: None,
        line_number: None,
        suggestion: None,
    }
}

#[test]
fn exit_code_logic_triggers_only_on_errors() {
    // Simulate: only warning/suggestion issues survive, so the CLI exits 0.
    let issues = vec![
        issue(Severity::Warning, "w"),
        issue(Severity::Suggestion, "s"),
    ];
    assert!(!issues.iter().any(|i| i.severity == Severity::Error));

    let issues = vec![issue(Severity::Error, "e"), issue(Severity::Warning, "w")];
    assert!(issues.iter().any(|i| i.severity == Severity::Error));
}

#[test]
fn thresholds_are_monotone() {
    let issues = vec![
        issue(Severity::Suggestion, "a"),
        issue(Severity::Error, "b"),
        issue(Severity::Warning, "c"),
        issue(Severity::Error, "d"),
    ];

    let at_error = filter_issues_by_severity(&issues, Severity::Error);
    let at_warning = filter_issues_by_severity(&issues, Severity::Warning);
    let at_suggestion = filter_issues_by_severity(&issues, Severity::Suggestion);

    for kept in &at_error {
        assert!(at_warning.contains(kept));
    }
    for kept in &at_warning {
        assert!(at_suggestion.contains(kept));
    }
    assert_eq!(at_suggestion.len(), issues.len());
}

#[test]
fn filtering_at_lowest_level_keeps_everything() {
    let issues = vec![
        issue(Severity::Error, "e"),
        issue(Severity::Warning, "w"),
        issue(Severity::Suggestion, "s"),
    ];
    let kept = filter_issues_by_severity(&issues, Severity::lowest());
    assert_eq!(kept, issues);
}

#[test]
fn surviving_issues_keep_relative_order() {
    let issues = vec![
        issue(Severity::Warning, "first"),
        issue(Severity::Suggestion, "skipped"),
        issue(Severity::Error, "second"),
        issue(Severity::Warning, "third"),
    ];
    let kept = filter_issues_by_severity(&issues, Severity::Warning);
    let messages: Vec<&str> = kept.iter().map(|i| i.message.as_str()).collect();
    assert_eq!(messages, vec!["first", "second", "third"]);
}
