//! `sf recipe list|validate|show` specs.

use crate::prelude::*;

#[test]
fn list_shows_recipes_in_dir() {
    let project = Project::empty();
    project.file(".sf/recipes/context.yaml", CONTEXT_RECIPE);
    project.file(".sf/recipes/minimal.yaml", MINIMAL_RECIPE);

    let output = project.sf().args(["recipe", "list"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("context-demo"));
    assert!(stdout.contains("minimal"));
    assert!(stdout.contains("NAME"));
}

#[test]
fn list_filters_by_tag() {
    let project = Project::empty();
    project.file(".sf/recipes/context.yaml", CONTEXT_RECIPE);
    project.file(".sf/recipes/minimal.yaml", MINIMAL_RECIPE);

    let output = project
        .sf()
        .args(["recipe", "list", "--tags", "demo", "-f", "json"])
        .output()
        .unwrap();
    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = entries
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["context-demo"]);
}

#[test]
fn list_custom_recipe_dir() {
    let project = Project::empty();
    project.file("elsewhere/r.yaml", MINIMAL_RECIPE);
    let output = project
        .sf()
        .args(["recipe", "list", "--recipe-dir", "elsewhere", "-f", "json"])
        .output()
        .unwrap();
    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(entries.as_array().unwrap().len(), 1);
}

#[test]
fn validate_accepts_good_recipe() {
    let project = Project::empty();
    project.file("wf.yaml", CONTEXT_RECIPE);
    let output = project
        .sf()
        .args(["recipe", "validate", "wf.yaml", "--verbose"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("valid"));
    assert!(stdout.contains("context-demo"));
}

#[test]
fn validate_rejects_missing_steps_naming_the_field() {
    let project = Project::empty();
    project.file("bad.yaml", "name: broken\n");
    let output = project
        .sf()
        .args(["recipe", "validate", "bad.yaml"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("steps"), "stderr: {stderr}");
}

#[test]
fn validate_rejects_unknown_step_kind() {
    let project = Project::empty();
    project.file(
        "bad.yaml",
        "name: broken\nsteps:\n  - id: a\n    kind: teleport\n",
    );
    project
        .sf()
        .args(["recipe", "validate", "bad.yaml"])
        .assert()
        .code(1);
}

#[test]
fn validate_json_report() {
    let project = Project::empty();
    project.file("bad.yaml", "name: broken\n");
    let output = project
        .sf()
        .args(["recipe", "validate", "bad.yaml", "-f", "json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["valid"], false);
}

#[test]
fn show_prints_metadata_steps_and_context() {
    let project = Project::empty();
    project.file("wf.yaml", CONTEXT_RECIPE);
    let output = project
        .sf()
        .args(["recipe", "show", "wf.yaml", "--steps", "--context"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("name: context-demo"));
    assert!(stdout.contains("version: 1.0"));
    assert!(stdout.contains("who = recipe-default"));
    assert!(stdout.contains("greet"));
    assert!(stdout.contains("set_context"));
}

#[test]
fn show_json_serializes_the_recipe() {
    let project = Project::empty();
    project.file("wf.yaml", CONTEXT_RECIPE);
    let output = project
        .sf()
        .args(["recipe", "show", "wf.yaml", "-f", "json"])
        .output()
        .unwrap();
    let recipe: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(recipe["name"], "context-demo");
    assert_eq!(recipe["steps"][0]["id"], "greet");
}
