//! `sf recipe run` specs: execution, context precedence, exit codes.

use crate::prelude::*;

#[test]
fn run_minimal_recipe_succeeds() {
    let project = Project::empty();
    project.file("wf.yaml", MINIMAL_RECIPE);

    let output = project
        .sf()
        .args(["recipe", "run", "wf.yaml"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("minimal: ok"), "stdout: {stdout}");
}

#[test]
fn run_reports_step_output_in_json() {
    let project = Project::empty();
    project.file("wf.yaml", CONTEXT_RECIPE);

    let output = project
        .sf()
        .args(["recipe", "run", "wf.yaml", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["recipe_name"], "context-demo");
    assert_eq!(result["success"], true);
    assert_eq!(result["step_results"][0]["stdout"], "hello recipe-default\n");
    // Outputs bind a dot-navigable record into the final context.
    assert_eq!(
        result["final_context"]["greet_run"]["stdout"],
        "hello recipe-default"
    );
    assert_eq!(result["final_context"]["greeted"], true);
}

#[test]
fn user_context_overrides_recipe_defaults() {
    let project = Project::empty();
    project.file("wf.yaml", CONTEXT_RECIPE);

    let output = project
        .sf()
        .args([
            "recipe",
            "run",
            "wf.yaml",
            "--context",
            "who=cli-user",
            "-f",
            "json",
        ])
        .output()
        .unwrap();
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["step_results"][0]["stdout"], "hello cli-user\n");
}

#[test]
fn failing_step_exits_one_with_diagnostics() {
    let project = Project::empty();
    project.file(
        "wf.yaml",
        "name: failing\nsteps:\n  - id: boom\n    kind: shell\n    command: 'echo oops >&2; exit 3'\n",
    );

    let output = project
        .sf()
        .args(["recipe", "run", "wf.yaml"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("boom"), "stderr: {stderr}");
}

#[test]
fn dry_run_has_no_side_effects() {
    let project = Project::empty();
    let marker = project.path().join("marker");
    project.file(
        "wf.yaml",
        &format!(
            "name: t\nsteps:\n  - id: touch\n    kind: shell\n    command: 'touch {}'\n",
            marker.display()
        ),
    );

    project
        .sf()
        .args(["recipe", "run", "wf.yaml", "--dry-run"])
        .assert()
        .success();
    assert!(!marker.exists(), "dry run must not execute commands");
}

#[test]
fn timeout_kills_step_and_reports_failure() {
    let project = Project::empty();
    project.file(
        "wf.yaml",
        "name: slow\nsteps:\n  - id: hang\n    kind: shell\n    command: 'echo early; sleep 60'\n    timeout_secs: 1\n",
    );

    let start = std::time::Instant::now();
    let output = project
        .sf()
        .args(["recipe", "run", "wf.yaml", "-f", "json"])
        .output()
        .unwrap();
    assert!(
        start.elapsed() < std::time::Duration::from_secs(20),
        "timeout + grace must bound the wall time"
    );
    assert_eq!(output.status.code(), Some(1));

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let step = &result["step_results"][0];
    assert_eq!(step["failure"]["kind"], "timeout");
    // Partial output produced before the kill is preserved.
    assert_eq!(step["stdout"], "early\n");
}

#[test]
fn missing_recipe_file_exits_one() {
    let project = Project::empty();
    project
        .sf()
        .args(["recipe", "run", "nope.yaml"])
        .assert()
        .code(1);
}

#[test]
fn yaml_output_round_trips() {
    let project = Project::empty();
    project.file("wf.yaml", MINIMAL_RECIPE);
    let output = project
        .sf()
        .args(["recipe", "run", "wf.yaml", "-f", "yaml"])
        .output()
        .unwrap();
    let result: serde_yaml::Value = serde_yaml::from_slice(&output.stdout).unwrap();
    assert_eq!(result["recipe_name"], "minimal");
}

#[test]
fn session_log_dir_receives_entries() {
    let project = Project::empty();
    project.file("wf.yaml", MINIMAL_RECIPE);
    project
        .sf()
        .args(["recipe", "run", "wf.yaml", "--log-dir", "logs"])
        .assert()
        .success();
    let entries: Vec<_> = std::fs::read_dir(project.path().join("logs"))
        .unwrap()
        .collect();
    assert_eq!(entries.len(), 1);
}
