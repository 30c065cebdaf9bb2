//! `sf classify` specs: gate bypasses, routing, announcements, tiers.

use crate::prelude::*;

#[test]
fn slash_command_bypasses_classification() {
    let project = Project::empty();
    let output = project
        .sf()
        .args(["classify", "/help"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("bypassed"));
    assert!(stdout.contains("explicit_command"));
    assert!(!stdout.contains("WORKFLOW:"));
}

#[test]
fn follow_up_bypasses_classification() {
    let project = Project::empty();
    let output = project
        .sf()
        .args(["classify", "--follow-up", "implement", "the", "feature"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("follow_up_message"));
}

#[test]
fn investigation_keywords_route_and_announce() {
    let project = Project::empty();
    let output = project
        .sf()
        .args(["classify", "investigate", "how", "authentication", "works"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("WORKFLOW: INVESTIGATION"), "stdout: {stdout}");
    assert!(stdout.contains("Reason: keyword 'investigate'"));
    assert!(stdout.contains("Following: .sf/workflows/investigation-workflow.md"));
}

#[test]
fn default_wins_on_mixed_signals() {
    let project = Project::empty();
    let output = project
        .sf()
        .args(["classify", "implement", "JWT", "auth", "and", "explain", "briefly"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("WORKFLOW: DEFAULT"), "stdout: {stdout}");
}

#[test]
fn json_outcome_includes_tier_information() {
    let project = Project::empty();
    let output = project
        .sf()
        .args(["classify", "fix", "the", "login", "bug", "-f", "json"])
        .output()
        .unwrap();
    let outcome: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcome["activated"], true);
    assert_eq!(outcome["context"]["workflow"], "DEFAULT");
    // No recipe dir in an empty project: markdown fallback.
    assert_eq!(outcome["tier"], 3);
    assert_eq!(outcome["method"], "markdown");
    assert_eq!(outcome["status"], "success");
}

#[test]
fn recipe_dir_enables_tier1_execution() {
    let project = Project::empty();
    project.file(
        ".sf/recipes/default.yaml",
        "name: default-workflow\nsteps:\n  - id: ok\n    kind: shell\n    command: 'echo tier one ran'\n",
    );
    let output = project
        .sf()
        .args(["classify", "fix", "the", "login", "bug", "-f", "json"])
        .output()
        .unwrap();
    let outcome: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcome["tier"], 1, "outcome: {outcome}");
    assert_eq!(outcome["method"], "recipe_runner");
    assert_eq!(outcome["execution"]["recipe"], "default-workflow");
}

#[test]
fn qa_requests_are_direct_with_no_tier() {
    let project = Project::empty();
    let output = project
        .sf()
        .args(["classify", "quick", "question", "about", "configs", "-f", "json"])
        .output()
        .unwrap();
    let outcome: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcome["context"]["workflow"], "Q&A");
    assert!(outcome.get("tier").is_none());
    assert_eq!(outcome["method"], "direct");
}

#[test]
fn sf_use_recipes_zero_disables_tier1() {
    let project = Project::empty();
    project.file(
        ".sf/recipes/default.yaml",
        "name: default-workflow\nsteps:\n  - id: ok\n    kind: shell\n    command: 'echo nope'\n",
    );
    let output = project
        .sf()
        .env("SF_USE_RECIPES", "0")
        .args(["classify", "fix", "the", "bug", "-f", "json"])
        .output()
        .unwrap();
    let outcome: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcome["tier"], 3);
}

#[test]
fn classification_time_is_recorded() {
    let project = Project::empty();
    let output = project
        .sf()
        .args(["classify", "refactor", "the", "parser", "-f", "json"])
        .output()
        .unwrap();
    let outcome: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(outcome["classification_time_secs"].as_f64().unwrap() >= 0.0);
}

#[test]
fn log_dir_records_classification_entry() {
    let project = Project::empty();
    project
        .sf()
        .args([
            "classify",
            "fix",
            "it",
            "--session-id",
            "spec-session",
            "--log-dir",
            "logs",
        ])
        .assert()
        .success();
    let content =
        std::fs::read_to_string(project.path().join("logs/spec-session.jsonl")).unwrap();
    assert!(content.contains("\"kind\":\"classification\""));
}
