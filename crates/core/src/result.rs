// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution result records: tier cascade outcomes, per-step records, and
//! whole-recipe results.

use crate::{Value, Workflow};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Overall status of a cascade execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecStatus {
    Success,
    Failed,
}

/// Result of executing a workflow through the tier cascade.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Tier that ultimately ran (1, 2, or 3); `None` when the workflow has
    /// no recipe and was handled directly.
    pub tier: Option<u8>,
    /// Execution method name (`recipe_runner`, `workflow_skill`,
    /// `markdown`, `direct`).
    pub method: String,
    pub status: ExecStatus,
    pub workflow: Workflow,
    /// Recipe name used by Tier 1, when applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe: Option<String>,
    /// Wall time since `execute` began.
    pub execution_time_secs: f64,
    /// Number of tiers that were attempted and failed before this one.
    pub fallback_count: u32,
    /// Why earlier tiers were abandoned, preserved for diagnostics even
    /// when the eventual tier succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.status == ExecStatus::Success
    }
}

/// Terminal status of one recipe step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Succeeded,
    Failed,
    /// `when` guard evaluated false.
    Skipped,
    /// Dry-run mode: recorded without side effects.
    DryRun,
    /// The run was interrupted while this step was in flight.
    Interrupted,
}

impl StepStatus {
    /// Whether this status counts against overall recipe success.
    pub fn is_failure(&self) -> bool {
        matches!(self, StepStatus::Failed | StepStatus::Interrupted)
    }
}

/// Why a step failed, as a coarse machine-readable category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    SpawnFailed,
    Timeout,
    NonZeroExit,
    Crashed,
    AgentReference,
    AgentNotFound,
    AgentInvoke,
    Expression,
    Template,
    Interrupted,
}

/// Failure detail attached to a failed [`StepResult`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepFailure {
    pub kind: FailureKind,
    /// Full diagnostic, including the rendered command or expression where
    /// relevant, so a failure can be reproduced from the record alone.
    pub message: String,
}

/// Record of one executed (or skipped) step.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepResult {
    pub step_id: String,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stdout: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stderr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub duration_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<StepFailure>,
    /// Context keys this step wrote, with the values written.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub context_delta: IndexMap<String, Value>,
}

impl StepResult {
    /// A zero-duration record with the given status and no output.
    pub fn bare(step_id: impl Into<String>, status: StepStatus) -> Self {
        Self {
            step_id: step_id.into(),
            status,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            duration_secs: 0.0,
            failure: None,
            context_delta: IndexMap::new(),
        }
    }

    /// A failed record carrying a failure kind and message.
    pub fn failed(step_id: impl Into<String>, kind: FailureKind, message: impl Into<String>) -> Self {
        let mut result = Self::bare(step_id, StepStatus::Failed);
        result.failure = Some(StepFailure {
            kind,
            message: message.into(),
        });
        result
    }

    pub fn is_failure(&self) -> bool {
        self.status.is_failure()
    }
}

/// Result of a whole recipe run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecipeResult {
    pub recipe_name: String,
    /// True iff every recorded step either succeeded or had its failure
    /// explicitly tolerated via `continue_on_error`.
    pub success: bool,
    /// True when the run was cut short by an interrupt; consumers map this
    /// to exit code 130.
    #[serde(default)]
    pub interrupted: bool,
    pub step_results: Vec<StepResult>,
    pub final_context: IndexMap<String, Value>,
    pub duration_secs: f64,
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
