// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic keyword-based workflow classification.

use sf_core::{Classification, Workflow};
use thiserror::Error;

/// Errors from classification.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("request cannot be empty")]
    EmptyRequest,
}

/// Default keyword table, grouped by workflow.
///
/// Matching is case-insensitive substring search over the whole request.
const DEFAULT_KEYWORDS: &[(Workflow, &[&str])] = &[
    (
        Workflow::Qa,
        &[
            "what is",
            "explain briefly",
            "quick question",
            "how do i run",
            "what does",
            "can you explain",
        ],
    ),
    (
        Workflow::Ops,
        &[
            "run command",
            "disk cleanup",
            "repo management",
            "git operations",
            "delete files",
            "cleanup",
            "organize",
            "clean up",
            "manage",
        ],
    ),
    (
        Workflow::Investigation,
        &[
            "investigate",
            "understand",
            "analyze",
            "research",
            "explore",
            "how does",
            "how it works",
        ],
    ),
    (
        Workflow::Default,
        &[
            "implement",
            "add",
            "fix",
            "create",
            "refactor",
            "update",
            "build",
            "develop",
            "remove",
            "delete",
            "modify",
        ],
    ),
];

/// Classifies session requests into workflows.
///
/// Stateless apart from its keyword table; identical input always
/// classifies identically.
#[derive(Debug, Clone)]
pub struct WorkflowClassifier {
    keyword_map: Vec<(Workflow, Vec<String>)>,
}

impl Default for WorkflowClassifier {
    fn default() -> Self {
        Self {
            keyword_map: DEFAULT_KEYWORDS
                .iter()
                .map(|(w, kws)| (*w, kws.iter().map(|s| s.to_string()).collect()))
                .collect(),
        }
    }
}

impl WorkflowClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend one workflow's keyword set (custom keywords add to the
    /// defaults, they don't replace them).
    pub fn extend_keywords(mut self, workflow: Workflow, keywords: &[&str]) -> Self {
        if let Some((_, existing)) = self.keyword_map.iter_mut().find(|(w, _)| *w == workflow) {
            existing.extend(keywords.iter().map(|s| s.to_lowercase()));
        }
        self
    }

    /// Classify a request.
    ///
    /// Priority on multiple matches is `DEFAULT > INVESTIGATION > OPS >
    /// Q&A`: development intent dominates when signals are ambiguous.
    /// Confidence is 0.9 on any keyword match, 0.5 (with an "ambiguous"
    /// reason) when nothing matched.
    pub fn classify(&self, request: &str) -> Result<Classification, ClassifyError> {
        if request.trim().is_empty() {
            return Err(ClassifyError::EmptyRequest);
        }

        let lowered = request.to_lowercase();
        let keywords: Vec<String> = self
            .keyword_map
            .iter()
            .flat_map(|(_, kws)| kws.iter())
            .filter(|kw| lowered.contains(kw.as_str()))
            .cloned()
            .collect();

        for workflow in Workflow::ALL {
            let Some((_, group)) = self.keyword_map.iter().find(|(w, _)| *w == workflow) else {
                continue;
            };
            if let Some(matched) = keywords.iter().find(|kw| group.contains(kw)) {
                let classification = Classification {
                    workflow,
                    reason: format!("keyword '{}'", matched),
                    confidence: 0.9,
                    keywords,
                };
                tracing::debug!(workflow = %workflow, reason = %classification.reason, "classified request");
                return Ok(classification);
            }
        }

        tracing::debug!("no keywords matched; defaulting");
        Ok(Classification {
            workflow: Workflow::Default,
            reason: "ambiguous request, defaulting to DEFAULT workflow".to_string(),
            confidence: 0.5,
            keywords,
        })
    }

    /// Format the user-facing announcement banner.
    ///
    /// Pure function of the classification and Tier 1 availability.
    pub fn format_announcement(
        &self,
        classification: &Classification,
        recipe_runner_available: bool,
        workflow_dir: &str,
    ) -> String {
        let workflow = classification.workflow;
        let mut announcement = format!(
            "WORKFLOW: {}\nReason: {}\nFollowing: {}/{}",
            workflow,
            classification.reason,
            workflow_dir,
            workflow.doc_file()
        );
        if recipe_runner_available {
            if let Some(recipe) = workflow.recipe_name() {
                announcement.push_str(&format!("\nExecution: Recipe Runner (tier 1) - {}", recipe));
            }
        }
        announcement
    }
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
