// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn step_status_failure_classes() {
    assert!(StepStatus::Failed.is_failure());
    assert!(StepStatus::Interrupted.is_failure());
    assert!(!StepStatus::Succeeded.is_failure());
    assert!(!StepStatus::Skipped.is_failure());
    assert!(!StepStatus::DryRun.is_failure());
}

#[test]
fn failed_constructor_attaches_failure() {
    let r = StepResult::failed("build", FailureKind::NonZeroExit, "exit code 2");
    assert_eq!(r.status, StepStatus::Failed);
    let failure = r.failure.unwrap();
    assert_eq!(failure.kind, FailureKind::NonZeroExit);
    assert!(failure.message.contains("exit code 2"));
}

#[test]
fn step_result_json_omits_empty_fields() {
    let r = StepResult::bare("fetch", StepStatus::Succeeded);
    let json = serde_json::to_string(&r).unwrap();
    assert!(!json.contains("stdout"));
    assert!(!json.contains("failure"));
    assert!(!json.contains("context_delta"));
}

#[test]
fn execution_result_round_trips() {
    let result = ExecutionResult {
        tier: Some(3),
        method: "markdown".to_string(),
        status: ExecStatus::Success,
        workflow: Workflow::Default,
        recipe: None,
        execution_time_secs: 0.01,
        fallback_count: 1,
        fallback_reason: Some("Tier 1 failed: recipe not found".to_string()),
    };
    let json = serde_json::to_string(&result).unwrap();
    let back: ExecutionResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back.tier, Some(3));
    assert_eq!(back.status, ExecStatus::Success);
    assert!(back.fallback_reason.unwrap().contains("Tier 1 failed"));
}

#[test]
fn recipe_result_serializes_context() {
    let mut ctx = IndexMap::new();
    ctx.insert("branch".to_string(), Value::from("main"));
    let result = RecipeResult {
        recipe_name: "default-workflow".to_string(),
        success: true,
        interrupted: false,
        step_results: vec![StepResult::bare("sync", StepStatus::Succeeded)],
        final_context: ctx,
        duration_secs: 1.25,
    };
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["final_context"]["branch"], "main");
    assert_eq!(json["step_results"][0]["status"], "succeeded");
}
