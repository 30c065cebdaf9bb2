// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::cascade::{ExecutionTierCascade, USE_RECIPES_ENV};
use crate::classifier::WorkflowClassifier;
use crate::runner::RecipeRunner;
use serial_test::serial;
use sf_core::{ExecStatus, SessionRequest, Value, Workflow};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn gate() -> SessionGate {
    SessionGate::default()
}

fn first_message(prompt: &str) -> SessionRequest {
    SessionRequest {
        prompt: prompt.to_string(),
        session_id: "test-session".into(),
        is_first_message: true,
        is_explicit_command: false,
    }
}

#[tokio::test]
#[serial]
async fn slash_command_bypasses() {
    std::env::remove_var(USE_RECIPES_ENV);
    let outcome = gate().process(&first_message("/help")).await;
    assert!(outcome.bypassed);
    assert!(!outcome.activated);
    assert_eq!(outcome.reason.as_deref(), Some("explicit_command"));
    assert!(outcome.announcement.is_none());
    assert!(outcome.classification.is_none());
}

#[tokio::test]
#[serial]
async fn explicit_command_flag_bypasses() {
    std::env::remove_var(USE_RECIPES_ENV);
    let mut request = first_message("implement a feature");
    request.is_explicit_command = true;
    let outcome = gate().process(&request).await;
    assert!(outcome.bypassed);
    assert_eq!(outcome.reason.as_deref(), Some("explicit_command"));
}

#[tokio::test]
#[serial]
async fn follow_up_message_bypasses() {
    std::env::remove_var(USE_RECIPES_ENV);
    let mut request = first_message("implement a feature");
    request.is_first_message = false;
    let outcome = gate().process(&request).await;
    assert!(outcome.bypassed);
    assert!(!outcome.activated);
    assert_eq!(outcome.reason.as_deref(), Some("follow_up_message"));
}

#[tokio::test]
#[serial]
async fn empty_prompt_fails_open() {
    std::env::remove_var(USE_RECIPES_ENV);
    let outcome = gate().process(&first_message("   ")).await;
    assert!(!outcome.activated);
    assert!(!outcome.bypassed);
    assert!(outcome.announcement.is_none());
}

#[tokio::test]
#[serial]
async fn first_message_activates_classification() {
    std::env::remove_var(USE_RECIPES_ENV);
    let outcome = gate()
        .process(&first_message("investigate how authentication works"))
        .await;
    assert!(outcome.activated);
    assert!(!outcome.bypassed);

    let classification = outcome.classification.as_ref().unwrap();
    assert_eq!(classification.workflow, Workflow::Investigation);
    assert_eq!(classification.confidence, 0.9);
    assert!(classification.reason.contains("investigate"));

    let announcement = outcome.announcement.as_ref().unwrap();
    assert!(announcement.starts_with("WORKFLOW: INVESTIGATION"));

    // No recipe runner injected: cascade lands on tier 3.
    assert_eq!(outcome.tier, Some(3));
    assert_eq!(outcome.method.as_deref(), Some("markdown"));
    assert_eq!(outcome.status, Some(ExecStatus::Success));
    assert!(outcome.classification_time_secs >= 0.0);
}

#[tokio::test]
#[serial]
async fn ambiguity_defaults_to_default_workflow() {
    std::env::remove_var(USE_RECIPES_ENV);
    let outcome = gate()
        .process(&first_message("implement JWT auth and explain briefly"))
        .await;
    assert_eq!(outcome.workflow, Some(Workflow::Default));
}

#[tokio::test]
#[serial]
async fn qa_is_handled_directly_without_tiers() {
    std::env::remove_var(USE_RECIPES_ENV);
    let outcome = gate()
        .process(&first_message("quick question about the config"))
        .await;
    assert!(outcome.activated);
    assert_eq!(outcome.workflow, Some(Workflow::Qa));
    assert_eq!(outcome.tier, None);
    assert_eq!(outcome.method.as_deref(), Some("direct"));
    assert_eq!(outcome.status, Some(ExecStatus::Success));
    assert!(outcome.execution.is_none());
}

#[tokio::test]
#[serial]
async fn context_is_augmented_with_classification_results() {
    std::env::remove_var(USE_RECIPES_ENV);
    let outcome = gate().process(&first_message("fix the login bug")).await;
    let context = &outcome.context;
    assert_eq!(context.get("prompt"), Some(&Value::from("fix the login bug")));
    assert_eq!(context.get("workflow"), Some(&Value::from("DEFAULT")));
    assert!(context.contains_key("classification"));
    assert!(context.contains_key("classification_time_secs"));
    assert_eq!(context.get("tier"), Some(&Value::Int(3)));
    assert_eq!(context.get("status"), Some(&Value::from("success")));
    // The nested classification is dot-navigable as a map.
    let classification = context.get("classification").unwrap().as_map().unwrap();
    assert_eq!(classification.get("workflow"), Some(&Value::from("DEFAULT")));
}

#[tokio::test]
#[serial]
async fn tier1_execution_flows_through_the_gate() {
    std::env::remove_var(USE_RECIPES_ENV);
    let recipes = TempDir::new().unwrap();
    fs::write(
        recipes.path().join("default.yaml"),
        "name: default-workflow\nsteps:\n  - id: ok\n    kind: shell\n    command: 'echo ran'\n",
    )
    .unwrap();
    let runner = Arc::new(RecipeRunner::default().with_recipe_dir(recipes.path()));
    let cascade = ExecutionTierCascade::new().with_recipe_runner(runner);
    let gate = SessionGate::new(WorkflowClassifier::new(), cascade);

    let outcome = gate.process(&first_message("fix the cache bug")).await;
    assert_eq!(outcome.tier, Some(1));
    assert_eq!(outcome.method.as_deref(), Some("recipe_runner"));
    let announcement = outcome.announcement.unwrap();
    assert!(announcement.contains("Execution: Recipe Runner (tier 1) - default-workflow"));
}

#[tokio::test]
#[serial]
async fn session_log_records_classification() {
    std::env::remove_var(USE_RECIPES_ENV);
    let logs = TempDir::new().unwrap();
    let gate = gate().with_log_dir(logs.path());
    gate.process(&first_message("fix the login bug")).await;

    let content = fs::read_to_string(logs.path().join("test-session.jsonl")).unwrap();
    let entry: serde_json::Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
    assert_eq!(entry["kind"], "classification");
    assert_eq!(entry["workflow"], "DEFAULT");
}

#[tokio::test]
#[serial]
async fn outcome_serializes_to_json() {
    std::env::remove_var(USE_RECIPES_ENV);
    let outcome = gate().process(&first_message("implement parsing")).await;
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["activated"], true);
    assert_eq!(json["context"]["workflow"], "DEFAULT");
}
