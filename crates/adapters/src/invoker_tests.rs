// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn null_invoker_fails_with_configuration_hint() {
    let err = NullInvoker
        .invoke(InvokeRequest {
            agent_content: String::new(),
            prompt: String::new(),
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("SF_AGENT_CMD"));
}

#[tokio::test]
async fn command_invoker_pipes_content_and_prompt() {
    let invoker = CommandInvoker::new(vec!["cat".to_string()]);
    let out = invoker
        .invoke(InvokeRequest {
            agent_content: "# Architect".to_string(),
            prompt: "design the module".to_string(),
        })
        .await
        .unwrap();
    assert!(out.success);
    assert!(out.output.contains("# Architect"));
    assert!(out.output.contains("design the module"));
}

#[tokio::test]
async fn command_invoker_reports_failure_flag() {
    let invoker = CommandInvoker::new(vec![
        "sh".to_string(),
        "-c".to_string(),
        "cat >/dev/null; echo failed-output; exit 1".to_string(),
    ]);
    let out = invoker
        .invoke(InvokeRequest {
            agent_content: "a".to_string(),
            prompt: "b".to_string(),
        })
        .await
        .unwrap();
    assert!(!out.success);
    assert_eq!(out.output.trim(), "failed-output");
}
