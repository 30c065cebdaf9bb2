// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recipe and step definitions.
//!
//! Steps are a flat struct with a `kind` discriminant and optional
//! kind-specific fields; [`crate::parser`] enforces which fields each kind
//! requires so that a missing field is reported by name regardless of the
//! input format.

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sf_core::Value;
use std::sync::LazyLock;

/// Step ids: lowercase alphanumerics and hyphens, starting with an
/// alphanumeric.
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
pub static STEP_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9-]*$").expect("constant regex pattern is valid")
});

/// Context keys assignable by steps.
#[allow(clippy::expect_used)]
pub static CONTEXT_KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_.]*$").expect("constant regex pattern is valid")
});

/// A parsed recipe: an ordered list of steps plus context defaults.
///
/// Unknown top-level keys are ignored for forward compatibility; unknown
/// step kinds are a hard parse error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Context defaults, lowest merge priority.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub context: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub steps: Vec<Step>,
}

impl Recipe {
    /// Total number of steps including nested conditional sub-steps.
    pub fn step_count(&self) -> usize {
        fn count(step: &Step) -> usize {
            1 + step.step.as_deref().map_or(0, count)
        }
        self.steps.iter().map(|s| count(s)).sum()
    }
}

/// Discriminant for the four step kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Shell,
    AgentInvoke,
    SetContext,
    Conditional,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Shell => "shell",
            StepKind::AgentInvoke => "agent_invoke",
            StepKind::SetContext => "set_context",
            StepKind::Conditional => "conditional",
        }
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of a recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub kind: StepKind,

    /// Shell: command template rendered with shell-safe substitution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Shell: explicit argv, each element rendered as plain text. Preferred
    /// over `command` when both are present — no shell is involved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argv: Option<Vec<String>>,

    /// Agent invoke: `namespace:name` reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    /// Agent invoke: prompt template handed to the invoker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    /// Set context: key → expression, evaluated and assigned in order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<IndexMap<String, String>>,

    /// Conditional: the nested sub-step run when `when` holds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<Box<Step>>,

    /// Guard expression; a false value skips the step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<f64>,
    #[serde(default)]
    pub continue_on_error: bool,
    /// Context keys that receive this step's output record.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,
}

impl Step {
    /// A minimal shell step, used by tests and builders.
    pub fn shell(id: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: StepKind::Shell,
            command: Some(command.into()),
            argv: None,
            agent: None,
            prompt: None,
            set: None,
            step: None,
            when: None,
            timeout_secs: None,
            continue_on_error: false,
            outputs: Vec::new(),
        }
    }
}
