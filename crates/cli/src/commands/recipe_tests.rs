// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parse_key_value_splits_on_first_equals() {
    assert_eq!(
        parse_key_value("branch=feature/x=y").unwrap(),
        ("branch".to_string(), "feature/x=y".to_string())
    );
}

#[yare::parameterized(
    no_equals  = { "novalue" },
    empty_key  = { "=v" },
)]
fn parse_key_value_rejects_malformed(input: &str) {
    assert!(parse_key_value(input).is_err());
}

#[test]
fn context_values_parse_as_json_when_possible() {
    let ctx = build_user_context(vec![
        ("n".to_string(), "3".to_string()),
        ("on".to_string(), "true".to_string()),
        ("branch".to_string(), "main".to_string()),
        ("items".to_string(), "[1,2]".to_string()),
    ]);
    assert_eq!(ctx.get("n"), Some(&Value::Int(3)));
    assert_eq!(ctx.get("on"), Some(&Value::Bool(true)));
    assert_eq!(ctx.get("branch"), Some(&Value::from("main")));
    assert_eq!(
        ctx.get("items"),
        Some(&Value::List(vec![Value::Int(1), Value::Int(2)]))
    );
}

#[test]
fn status_labels_are_stable() {
    assert_eq!(status_label(StepStatus::Succeeded), "ok");
    assert_eq!(status_label(StepStatus::Failed), "failed");
    assert_eq!(status_label(StepStatus::Skipped), "skipped");
    assert_eq!(status_label(StepStatus::DryRun), "dry-run");
    assert_eq!(status_label(StepStatus::Interrupted), "interrupted");
}
