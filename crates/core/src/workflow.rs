// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The [`Workflow`] routing target and [`Classification`] result.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The four workflows a session request can be routed to.
///
/// Priority for ambiguous requests is `Default > Investigation > Ops > Qa`
/// (development intent dominates); the classifier owns that ordering, this
/// type only names the targets and their artifacts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Workflow {
    #[serde(rename = "Q&A")]
    Qa,
    #[serde(rename = "OPS")]
    Ops,
    #[serde(rename = "INVESTIGATION")]
    Investigation,
    #[serde(rename = "DEFAULT")]
    Default,
}

/// Error returned when parsing an unrecognized workflow name.
#[derive(Debug, Error)]
#[error("invalid workflow: {0}")]
pub struct InvalidWorkflow(pub String);

impl Workflow {
    /// All workflows, in classifier priority order.
    pub const ALL: [Workflow; 4] = [
        Workflow::Default,
        Workflow::Investigation,
        Workflow::Ops,
        Workflow::Qa,
    ];

    /// Canonical display name (`Q&A`, `OPS`, `INVESTIGATION`, `DEFAULT`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Workflow::Qa => "Q&A",
            Workflow::Ops => "OPS",
            Workflow::Investigation => "INVESTIGATION",
            Workflow::Default => "DEFAULT",
        }
    }

    /// Recipe name executed by Tier 1, if this workflow has one.
    ///
    /// Q&A and OPS are handled directly and have no recipe.
    pub fn recipe_name(&self) -> Option<&'static str> {
        match self {
            Workflow::Default => Some("default-workflow"),
            Workflow::Investigation => Some("investigation-workflow"),
            Workflow::Qa | Workflow::Ops => None,
        }
    }

    /// Whether Tier 1 applies to this workflow.
    pub fn has_recipe(&self) -> bool {
        self.recipe_name().is_some()
    }

    /// Markdown description file read by the Tier 3 fallback.
    pub fn doc_file(&self) -> &'static str {
        match self {
            Workflow::Qa => "qa-workflow.md",
            Workflow::Ops => "ops-workflow.md",
            Workflow::Investigation => "investigation-workflow.md",
            Workflow::Default => "default-workflow.md",
        }
    }
}

impl std::fmt::Display for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Workflow {
    type Err = InvalidWorkflow;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "Q&A" | "QA" => Ok(Workflow::Qa),
            "OPS" => Ok(Workflow::Ops),
            "INVESTIGATION" => Ok(Workflow::Investigation),
            "DEFAULT" => Ok(Workflow::Default),
            _ => Err(InvalidWorkflow(s.to_string())),
        }
    }
}

/// Result of classifying a session request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Classification {
    pub workflow: Workflow,
    /// One-line explanation (`keyword 'implement'`, or the ambiguity note).
    pub reason: String,
    /// 0.9 on a keyword match, 0.5 when nothing matched.
    pub confidence: f64,
    /// All matched keywords across every group, in table order.
    pub keywords: Vec<String>,
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
