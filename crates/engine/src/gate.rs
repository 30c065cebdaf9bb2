// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The session-start gate: decides whether classification fires for a
//! turn, runs it, and augments the session context with the results.

use crate::cascade::ExecutionTierCascade;
use crate::classifier::WorkflowClassifier;
use crate::session_log::SessionLogger;
use indexmap::IndexMap;
use serde::Serialize;
use sf_core::{Classification, ExecStatus, ExecutionResult, SessionRequest, Value, Workflow};
use std::path::PathBuf;
use std::time::Instant;

/// Default directory holding the workflow description markdown.
pub const DEFAULT_WORKFLOW_DIR: &str = ".sf/workflows";

/// Outcome of processing one session-start request.
#[derive(Debug, Default, Serialize)]
pub struct GateOutcome {
    /// Classification ran for this turn.
    pub activated: bool,
    /// A bypass rule matched; nothing ran.
    pub bypassed: bool,
    /// Bypass reason (`explicit_command`, `follow_up_message`) or the
    /// classification reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow: Option<Workflow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub announcement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution: Option<ExecutionResult>,
    /// Tier used, when the cascade ran. Q&A and OPS are handled directly
    /// and carry no tier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ExecStatus>,
    /// Classification error, recorded fail-open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Cascade error, recorded fail-open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_error: Option<String>,
    pub classification_time_secs: f64,
    /// The session context augmented with classification results.
    pub context: IndexMap<String, Value>,
}

/// Orchestrates session start: bypass check → classify → announce →
/// execute → augment.
pub struct SessionGate {
    classifier: WorkflowClassifier,
    cascade: ExecutionTierCascade,
    workflow_dir: String,
    log_dir: Option<PathBuf>,
}

impl Default for SessionGate {
    fn default() -> Self {
        Self::new(WorkflowClassifier::default(), ExecutionTierCascade::default())
    }
}

impl SessionGate {
    pub fn new(classifier: WorkflowClassifier, cascade: ExecutionTierCascade) -> Self {
        Self {
            classifier,
            cascade,
            workflow_dir: DEFAULT_WORKFLOW_DIR.to_string(),
            log_dir: None,
        }
    }

    pub fn with_workflow_dir(mut self, dir: impl Into<String>) -> Self {
        self.workflow_dir = dir.into();
        self
    }

    /// Enable the per-session JSONL activity log.
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Bypass reason for this request, if any rule matches.
    ///
    /// Rules in order: explicit command flag or `/`-prefixed prompt, then
    /// non-first message.
    fn bypass_reason(request: &SessionRequest) -> Option<&'static str> {
        if request.is_explicit_command || request.prompt.trim().starts_with('/') {
            return Some("explicit_command");
        }
        if !request.is_first_message {
            return Some("follow_up_message");
        }
        None
    }

    /// Process a session-start request.
    ///
    /// Fail-open throughout: classification and execution errors are
    /// recorded on the outcome and the surrounding session continues.
    pub async fn process(&self, request: &SessionRequest) -> GateOutcome {
        let start = Instant::now();
        let mut outcome = GateOutcome::default();

        if let Some(reason) = Self::bypass_reason(request) {
            tracing::debug!(reason, "classification bypassed");
            outcome.bypassed = true;
            outcome.reason = Some(reason.to_string());
            return outcome;
        }

        if request.prompt.trim().is_empty() {
            tracing::warn!("no user request provided in context");
            return outcome;
        }

        let classification = match self.classifier.classify(&request.prompt) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "classification failed");
                outcome.error = Some(e.to_string());
                return outcome;
            }
        };
        outcome.activated = true;
        outcome.reason = Some(classification.reason.clone());
        outcome.workflow = Some(classification.workflow);

        let recipe_runner_available = self.cascade.is_recipe_runner_available();
        outcome.announcement = Some(self.classifier.format_announcement(
            &classification,
            recipe_runner_available,
            &self.workflow_dir,
        ));

        let mut context = base_context(request);
        let workflow = classification.workflow;

        if workflow.has_recipe() {
            match self.cascade.execute(workflow, &context).await {
                Ok(execution) => {
                    outcome.tier = execution.tier;
                    outcome.method = Some(execution.method.clone());
                    outcome.status = Some(execution.status);
                    outcome.execution = Some(execution);
                }
                Err(e) => {
                    tracing::error!(error = %e, "workflow execution failed");
                    outcome.execution_error = Some(e.to_string());
                }
            }
        } else {
            // Q&A and OPS are handled directly; the tier concept does not
            // apply.
            outcome.tier = None;
            outcome.method = Some("direct".to_string());
            outcome.status = Some(ExecStatus::Success);
        }

        let classification_time_secs = start.elapsed().as_secs_f64();
        outcome.classification_time_secs = classification_time_secs;

        if let Some(log_dir) = &self.log_dir {
            let logger = SessionLogger::for_session(log_dir, &request.session_id);
            logger.append(
                "classification",
                serde_json::json!({
                    "workflow": classification.workflow,
                    "reason": classification.reason,
                    "confidence": classification.confidence,
                    "classification_time_secs": classification_time_secs,
                    "tier": outcome.tier,
                }),
            );
        }

        // Augment the context for downstream consumers.
        context.insert(
            "classification".to_string(),
            serde_json::to_value(&classification)
                .map(Value::from)
                .unwrap_or(Value::Null),
        );
        context.insert(
            "workflow".to_string(),
            Value::from(workflow.as_str()),
        );
        context.insert(
            "classification_time_secs".to_string(),
            Value::Float(classification_time_secs),
        );
        if let Some(tier) = outcome.tier {
            context.insert("tier".to_string(), Value::Int(tier as i64));
        }
        if let Some(method) = &outcome.method {
            context.insert("method".to_string(), Value::from(method.as_str()));
        }
        if let Some(status) = outcome.status {
            let status_str = match status {
                ExecStatus::Success => "success",
                ExecStatus::Failed => "failed",
            };
            context.insert("status".to_string(), Value::from(status_str));
        }
        outcome.context = context;
        outcome.classification = Some(classification);

        outcome
    }
}

/// The session context as handed in by the entry contract.
fn base_context(request: &SessionRequest) -> IndexMap<String, Value> {
    let mut context = IndexMap::new();
    context.insert("prompt".to_string(), Value::from(request.prompt.as_str()));
    context.insert(
        "session_id".to_string(),
        Value::from(request.session_id.to_string()),
    );
    context.insert(
        "is_first_message".to_string(),
        Value::Bool(request.is_first_message),
    );
    context
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
