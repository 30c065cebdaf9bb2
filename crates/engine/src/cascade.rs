// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The execution tier cascade.
//!
//! Three tiers, attempted in priority order with strict fallback:
//!
//! 1. Recipe runner — code-enforced workflow execution. Gated by
//!    `SF_USE_RECIPES` and requires an injected runner.
//! 2. Workflow skill — reserved for LLM-driven execution with the recipe
//!    file as a prompt. Unavailable until an implementation is injected;
//!    the cascade is already wired for it.
//! 3. Markdown — always available: a success result directing the caller
//!    to read the workflow description file.

use crate::error::EngineError;
use crate::runner::{RecipeRunner, RunOptions};
use async_trait::async_trait;
use indexmap::IndexMap;
use sf_core::{ExecStatus, ExecutionResult, Value, Workflow};
use std::sync::Arc;
use std::time::Instant;

/// Environment variable gating Tier 1. Explicitly setting it to "0"
/// disables the recipe runner even when one is injected.
pub const USE_RECIPES_ENV: &str = "SF_USE_RECIPES";

/// Tier 2 seam: LLM-driven workflow execution.
///
/// Implementations become available by returning `true` from
/// [`WorkflowSkill::is_available`]; the cascade needs no changes when one
/// arrives.
#[async_trait]
pub trait WorkflowSkill: Send + Sync {
    fn is_available(&self) -> bool {
        false
    }

    async fn execute(
        &self,
        workflow: Workflow,
        context: &IndexMap<String, Value>,
    ) -> Result<(), EngineError>;
}

/// Manages workflow execution across the three tiers.
pub struct ExecutionTierCascade {
    recipe_runner: Option<Arc<RecipeRunner>>,
    workflow_skill: Option<Arc<dyn WorkflowSkill>>,
    tier_priority: Vec<u8>,
}

impl Default for ExecutionTierCascade {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionTierCascade {
    pub fn new() -> Self {
        Self {
            recipe_runner: None,
            workflow_skill: None,
            tier_priority: vec![1, 2, 3],
        }
    }

    pub fn with_recipe_runner(mut self, runner: Arc<RecipeRunner>) -> Self {
        self.recipe_runner = Some(runner);
        self
    }

    pub fn with_workflow_skill(mut self, skill: Arc<dyn WorkflowSkill>) -> Self {
        self.workflow_skill = Some(skill);
        self
    }

    pub fn with_tier_priority(mut self, priority: Vec<u8>) -> Self {
        self.tier_priority = priority;
        self
    }

    /// Whether Tier 1 is enabled by the environment. Read fresh on every
    /// call, never cached.
    pub fn is_recipe_runner_enabled(&self) -> bool {
        std::env::var(USE_RECIPES_ENV).map(|v| v != "0").unwrap_or(true)
    }

    pub fn is_recipe_runner_available(&self) -> bool {
        self.is_recipe_runner_enabled() && self.recipe_runner.is_some()
    }

    pub fn is_workflow_skill_available(&self) -> bool {
        self.workflow_skill
            .as_ref()
            .is_some_and(|s| s.is_available())
    }

    /// Markdown is always available as the final fallback.
    pub fn is_markdown_available(&self) -> bool {
        true
    }

    /// Highest available tier under the configured priority order.
    pub fn detect_available_tier(&self) -> u8 {
        for tier in &self.tier_priority {
            match tier {
                1 if self.is_recipe_runner_available() => return 1,
                2 if self.is_workflow_skill_available() => return 2,
                3 => return 3,
                _ => {}
            }
        }
        3
    }

    /// Execute `workflow` via the highest available tier, falling back on
    /// failure. Tier 3 always succeeds; if the priority list excludes it
    /// and everything else fails, that is a fatal [`EngineError`].
    pub async fn execute(
        &self,
        workflow: Workflow,
        context: &IndexMap<String, Value>,
    ) -> Result<ExecutionResult, EngineError> {
        let start = Instant::now();
        let mut fallback_count = 0u32;
        let mut fallback_reason: Option<String> = None;

        for tier in &self.tier_priority {
            let attempt = match tier {
                1 if self.is_recipe_runner_available() => {
                    self.execute_tier1(workflow, context).await
                }
                2 if self.is_workflow_skill_available() => {
                    self.execute_tier2(workflow, context).await
                }
                3 => Ok(self.execute_tier3(workflow)),
                _ => continue,
            };

            match attempt {
                Ok(mut result) => {
                    result.execution_time_secs = start.elapsed().as_secs_f64();
                    result.fallback_count = fallback_count;
                    result.fallback_reason = fallback_reason;
                    if fallback_count > 0 {
                        tracing::info!(
                            tier = ?result.tier,
                            method = %result.method,
                            fallback_count,
                            "workflow executed after fallback"
                        );
                    } else {
                        tracing::info!(tier = ?result.tier, method = %result.method, "workflow executed");
                    }
                    return Ok(result);
                }
                Err(e) => {
                    tracing::warn!(tier, error = %e, "tier failed, attempting fallback");
                    fallback_reason = Some(format!("Tier {} failed: {}", tier, e));
                    fallback_count += 1;
                }
            }
        }

        let detail = fallback_reason.unwrap_or_else(|| "no tier available".to_string());
        tracing::error!(error = %detail, "all execution tiers failed");
        Err(EngineError::TierExhausted(detail))
    }

    async fn execute_tier1(
        &self,
        workflow: Workflow,
        context: &IndexMap<String, Value>,
    ) -> Result<ExecutionResult, EngineError> {
        let Some(recipe_name) = workflow.recipe_name() else {
            return Err(EngineError::InvalidInput(format!(
                "{} does not have a recipe",
                workflow
            )));
        };
        let Some(runner) = &self.recipe_runner else {
            return Err(EngineError::InvalidInput(
                "recipe runner not injected".to_string(),
            ));
        };

        let result = runner
            .run_by_name(recipe_name, context.clone(), &RunOptions::default())
            .await?;
        if !result.success {
            let failed_step = result
                .step_results
                .iter()
                .find(|s| s.is_failure())
                .map(|s| s.step_id.clone())
                .unwrap_or_else(|| "unknown".to_string());
            return Err(EngineError::RecipeFailed {
                name: recipe_name.to_string(),
                detail: format!("step `{}` failed", failed_step),
            });
        }

        Ok(ExecutionResult {
            tier: Some(1),
            method: "recipe_runner".to_string(),
            status: ExecStatus::Success,
            workflow,
            recipe: Some(recipe_name.to_string()),
            execution_time_secs: 0.0,
            fallback_count: 0,
            fallback_reason: None,
        })
    }

    async fn execute_tier2(
        &self,
        workflow: Workflow,
        context: &IndexMap<String, Value>,
    ) -> Result<ExecutionResult, EngineError> {
        let Some(skill) = &self.workflow_skill else {
            return Err(EngineError::InvalidInput(
                "workflow skill not injected".to_string(),
            ));
        };
        skill.execute(workflow, context).await?;
        Ok(ExecutionResult {
            tier: Some(2),
            method: "workflow_skill".to_string(),
            status: ExecStatus::Success,
            workflow,
            recipe: None,
            execution_time_secs: 0.0,
            fallback_count: 0,
            fallback_reason: None,
        })
    }

    /// Tier 3 never fails: the caller reads the workflow markdown
    /// directly.
    fn execute_tier3(&self, workflow: Workflow) -> ExecutionResult {
        ExecutionResult {
            tier: Some(3),
            method: "markdown".to_string(),
            status: ExecStatus::Success,
            workflow,
            recipe: None,
            execution_time_secs: 0.0,
            fallback_count: 0,
            fallback_reason: None,
        }
    }
}

#[cfg(test)]
#[path = "cascade_tests.rs"]
mod tests;
