//! End-to-end shell-quoting specs: hostile context values must round-trip
//! through a real shell as single tokens.

use crate::prelude::*;

/// Run `printf %s {{x}}` with a hostile value and assert the child saw the
/// value verbatim, as one argument.
fn assert_round_trips(attack: &str) {
    let project = Project::empty();
    project.file(
        "wf.yaml",
        "name: quoting\nsteps:\n  - id: echo-back\n    kind: shell\n    command: \"printf %s {{x}}\"\n",
    );
    let output = project
        .sf()
        .args(["recipe", "run", "wf.yaml", "-f", "json", "--context"])
        .arg(format!("x={}", attack))
        .output()
        .unwrap();
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        result["success"], true,
        "attack {:?} failed: {}",
        attack, result
    );
    assert_eq!(
        result["step_results"][0]["stdout"].as_str().unwrap(),
        attack,
        "attack {:?} did not round-trip",
        attack
    );
}

#[test]
fn command_separators_are_inert() {
    assert_round_trips("; rm -rf /");
    assert_round_trips("a && b || c");
    assert_round_trips("a | tee /etc/passwd");
}

#[test]
fn substitution_syntax_is_inert() {
    assert_round_trips("$(id)");
    assert_round_trips("`id`");
    assert_round_trips("${HOME}");
    assert_round_trips("<(id)");
}

#[test]
fn redirects_and_globs_are_inert() {
    assert_round_trips("> /tmp/pwned");
    assert_round_trips("*");
    assert_round_trips("?.rs");
    assert_round_trips("[abc]");
}

#[test]
fn quoting_tricks_are_inert() {
    assert_round_trips("it's a trap");
    assert_round_trips(r#"he said "sure""#);
    assert_round_trips(r"back\slash");
    assert_round_trips("'; id; '");
}

#[test]
fn whitespace_and_expansion_chars_are_inert() {
    assert_round_trips("two  words");
    assert_round_trips("line1\nline2");
    assert_round_trips("~root");
    assert_round_trips("{a,b}");
    assert_round_trips("ends with space ");
}

#[test]
fn injected_command_never_executes() {
    let project = Project::empty();
    let marker = project.path().join("pwned");
    project.file(
        "wf.yaml",
        "name: quoting\nsteps:\n  - id: echo-back\n    kind: shell\n    command: \"echo {{x}}\"\n",
    );
    project
        .sf()
        .args(["recipe", "run", "wf.yaml", "--context"])
        .arg(format!("x=$(touch {})", marker.display()))
        .assert()
        .success();
    assert!(!marker.exists(), "command substitution must not execute");
}
