//! CLI error-handling specs: usage errors and exit codes.

use crate::prelude::*;

#[test]
fn unknown_subcommand_is_a_usage_error() {
    sf_cmd().arg("frobnicate").assert().code(2);
}

#[test]
fn missing_required_argument_is_a_usage_error() {
    sf_cmd().args(["recipe", "run"]).assert().code(2);
}

#[test]
fn malformed_context_pair_is_a_usage_error() {
    let project = Project::empty();
    project.file("wf.yaml", MINIMAL_RECIPE);
    project
        .sf()
        .args(["recipe", "run", "wf.yaml", "--context", "not-a-pair"])
        .assert()
        .code(2);
}

#[test]
fn unsupported_recipe_extension_fails_functionally() {
    let project = Project::empty();
    project.file("wf.hcl", "name: x");
    let output = project
        .sf()
        .args(["recipe", "run", "wf.hcl"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported recipe format"), "stderr: {stderr}");
}

#[test]
fn help_lists_subcommands() {
    let output = sf_cmd().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("recipe"));
    assert!(stdout.contains("classify"));
}
