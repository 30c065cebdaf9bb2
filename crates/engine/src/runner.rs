// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The recipe runner: executes a recipe's steps in declared order against
//! a single owned context.

use crate::error::EngineError;
use crate::interrupt::InterruptHandle;
use crate::session_log::SessionLogger;
use indexmap::IndexMap;
use sf_adapters::invoker::{AgentInvoker, InvokeRequest, NullInvoker};
use sf_adapters::subprocess::{spawn, SpawnSpec, SubprocessError};
use sf_adapters::env as adapter_env;
use sf_core::{FailureKind, RecipeResult, StepResult, StepStatus, Value};
use sf_recipe::context::RecipeContext;
use sf_recipe::find::find_recipe_by_name;
use sf_recipe::model::{Recipe, Step, StepKind};
use sf_recipe::resolver::{AgentResolver, ResolveError};
use sf_recipe::template::TemplateError;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Per-run options.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Record synthetic results without executing anything.
    pub dry_run: bool,
    /// Working directory for shell steps.
    pub working_dir: Option<PathBuf>,
    pub verbose: bool,
}

/// Executes recipes. Owns the context and step records for the duration of
/// each run; nothing is shared across runs.
pub struct RecipeRunner {
    resolver: AgentResolver,
    invoker: Arc<dyn AgentInvoker>,
    recipe_dir: PathBuf,
    session_log: Option<SessionLogger>,
    interrupt: InterruptHandle,
}

impl Default for RecipeRunner {
    fn default() -> Self {
        Self::new(Arc::new(NullInvoker))
    }
}

impl RecipeRunner {
    pub fn new(invoker: Arc<dyn AgentInvoker>) -> Self {
        Self {
            resolver: AgentResolver::default(),
            invoker,
            recipe_dir: PathBuf::from(".sf/recipes"),
            session_log: None,
            interrupt: InterruptHandle::new(),
        }
    }

    pub fn with_resolver(mut self, resolver: AgentResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_recipe_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.recipe_dir = dir.into();
        self
    }

    pub fn with_session_log(mut self, logger: SessionLogger) -> Self {
        self.session_log = Some(logger);
        self
    }

    pub fn with_interrupt(mut self, interrupt: InterruptHandle) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// The handle callers use to stop a run (wired to ctrl-c by the CLI).
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    /// Locate a recipe by its `name` field under the runner's recipe
    /// directory and run it.
    pub async fn run_by_name(
        &self,
        name: &str,
        user_context: IndexMap<String, Value>,
        options: &RunOptions,
    ) -> Result<RecipeResult, EngineError> {
        let Some((recipe, path)) = find_recipe_by_name(&self.recipe_dir, name)? else {
            return Err(EngineError::RecipeNotFound(format!(
                "{} (searched {})",
                name,
                self.recipe_dir.display()
            )));
        };
        tracing::debug!(name, path = %path.display(), "resolved recipe by name");
        Ok(self.run(&recipe, user_context, options).await)
    }

    /// Run a recipe to completion (or first fatal failure / interrupt).
    ///
    /// Per-step failures become failed [`StepResult`]s, never errors; the
    /// overall result is failed when any non-tolerated step failed.
    pub async fn run(
        &self,
        recipe: &Recipe,
        user_context: IndexMap<String, Value>,
        options: &RunOptions,
    ) -> RecipeResult {
        let start = Instant::now();

        // Merge in increasing priority: recipe defaults, then user context.
        // Per-top-level-key replace; nested maps replace whole.
        let mut ctx = RecipeContext::new();
        ctx.merge_replace(&recipe.context);
        ctx.merge_replace(&user_context);

        let mut step_results: Vec<StepResult> = Vec::new();
        let mut success = true;
        let mut interrupted = false;

        tracing::info!(recipe = %recipe.name, steps = recipe.steps.len(), dry_run = options.dry_run, "recipe run started");

        for step in &recipe.steps {
            if self.interrupt.is_interrupted() {
                interrupted = true;
                break;
            }

            let result = self.execute_step(step, &mut ctx, options).await;
            self.log_step(&result);

            let stop = match result.status {
                StepStatus::Interrupted => {
                    interrupted = true;
                    success = false;
                    true
                }
                StepStatus::Failed if !step.continue_on_error => {
                    success = false;
                    true
                }
                // Tolerated failures don't count against overall success.
                _ => false,
            };
            step_results.push(result);
            if stop {
                break;
            }
        }

        let result = RecipeResult {
            recipe_name: recipe.name.clone(),
            success: success && !interrupted,
            interrupted,
            step_results,
            final_context: ctx.snapshot(),
            duration_secs: start.elapsed().as_secs_f64(),
        };
        tracing::info!(
            recipe = %recipe.name,
            success = result.success,
            interrupted = result.interrupted,
            duration_secs = result.duration_secs,
            "recipe run finished"
        );
        result
    }

    async fn execute_step(
        &self,
        step: &Step,
        ctx: &mut RecipeContext,
        options: &RunOptions,
    ) -> StepResult {
        // Guard first: a false `when` skips regardless of dry-run.
        if let Some(when) = &step.when {
            match ctx.evaluate(when) {
                Ok(value) if !value.is_truthy() => {
                    tracing::debug!(step = %step.id, "guard false; skipped");
                    return StepResult::bare(&step.id, StepStatus::Skipped);
                }
                Ok(_) => {}
                Err(e) => {
                    return StepResult::failed(
                        &step.id,
                        FailureKind::Expression,
                        format!("guard `{}`: {}", when, e),
                    );
                }
            }
        }

        match step.kind {
            StepKind::Conditional => {
                // The guard held; recurse into the nested sub-step. The
                // record carries the nested step's id.
                let Some(nested) = step.step.as_deref() else {
                    return StepResult::failed(
                        &step.id,
                        FailureKind::Expression,
                        "conditional step has no nested step",
                    );
                };
                Box::pin(self.execute_step(nested, ctx, options)).await
            }
            _ if options.dry_run => StepResult::bare(&step.id, StepStatus::DryRun),
            StepKind::Shell => self.run_shell_step(step, ctx, options).await,
            StepKind::AgentInvoke => self.run_agent_step(step, ctx).await,
            StepKind::SetContext => run_set_step(step, ctx),
        }
    }

    async fn run_shell_step(
        &self,
        step: &Step,
        ctx: &mut RecipeContext,
        options: &RunOptions,
    ) -> StepResult {
        let start = Instant::now();

        // Prefer split argv (no shell involved); fall back to a rendered
        // command string with shell-quoted substitution.
        let spec = match &step.argv {
            Some(argv_templates) => {
                let mut argv = Vec::with_capacity(argv_templates.len());
                for template in argv_templates {
                    match ctx.render(template) {
                        Ok(arg) => argv.push(arg),
                        Err(e) => return template_failure(step, e),
                    }
                }
                SpawnSpec::new(argv)
            }
            None => {
                let command = step.command.as_deref().unwrap_or_default();
                match ctx.render_shell(command) {
                    Ok(rendered) => SpawnSpec::shell(rendered),
                    Err(e) => return template_failure(step, e),
                }
            }
        };

        let timeout = step
            .timeout_secs
            .map(Duration::from_secs_f64)
            .unwrap_or_else(adapter_env::default_step_timeout);
        let mut spec = spec.timeout(timeout).check(true).non_interactive(true);
        if let Some(dir) = &options.working_dir {
            spec = spec.working_dir(dir);
        }
        let argv_for_log = spec.argv.clone();

        if let Some(log) = &self.session_log {
            log.append(
                "spawn",
                serde_json::json!({ "step_id": step.id, "argv": argv_for_log }),
            );
        }

        let spawn_result = tokio::select! {
            result = spawn(spec) => result,
            () = self.interrupt.interrupted() => {
                // Dropping the spawn future kills the child (kill_on_drop).
                let mut result = StepResult::bare(&step.id, StepStatus::Interrupted);
                result.duration_secs = start.elapsed().as_secs_f64();
                result.failure = Some(sf_core::StepFailure {
                    kind: FailureKind::Interrupted,
                    message: "interrupted while running".to_string(),
                });
                return result;
            }
        };

        let mut result = match spawn_result {
            Ok(output) => {
                let mut r = StepResult::bare(&step.id, StepStatus::Succeeded);
                r.stdout = output.stdout;
                r.stderr = output.stderr;
                r.exit_code = output.exit_code;
                r
            }
            Err(e) => subprocess_failure(step, &argv_for_log, e),
        };
        result.duration_secs = start.elapsed().as_secs_f64();

        if result.status == StepStatus::Succeeded {
            bind_outputs(step, ctx, &mut result);
        }
        result
    }

    async fn run_agent_step(&self, step: &Step, ctx: &mut RecipeContext) -> StepResult {
        let start = Instant::now();
        let Some(reference) = step.agent.as_deref() else {
            return StepResult::failed(
                &step.id,
                FailureKind::AgentReference,
                "agent_invoke step has no agent reference",
            );
        };

        let agent_content = match self.resolver.resolve(reference) {
            Ok(content) => content,
            Err(e @ ResolveError::InvalidReference { .. }) => {
                return StepResult::failed(&step.id, FailureKind::AgentReference, e.to_string());
            }
            Err(e @ ResolveError::NotFound { .. }) => {
                return StepResult::failed(&step.id, FailureKind::AgentNotFound, e.to_string());
            }
        };

        let prompt = match step.prompt.as_deref() {
            Some(template) => match ctx.render(template) {
                Ok(p) => p,
                Err(e) => return template_failure(step, e),
            },
            None => String::new(),
        };

        let request = InvokeRequest {
            agent_content,
            prompt,
        };
        let invoke_result = tokio::select! {
            result = self.invoker.invoke(request) => result,
            () = self.interrupt.interrupted() => {
                let mut result = StepResult::bare(&step.id, StepStatus::Interrupted);
                result.duration_secs = start.elapsed().as_secs_f64();
                result.failure = Some(sf_core::StepFailure {
                    kind: FailureKind::Interrupted,
                    message: "interrupted while running".to_string(),
                });
                return result;
            }
        };

        let mut result = match invoke_result {
            Ok(output) if output.success => {
                let mut r = StepResult::bare(&step.id, StepStatus::Succeeded);
                r.stdout = output.output;
                r
            }
            Ok(output) => {
                let mut r = StepResult::failed(
                    &step.id,
                    FailureKind::AgentInvoke,
                    format!("agent `{}` reported failure", reference),
                );
                r.stdout = output.output;
                r
            }
            Err(e) => StepResult::failed(&step.id, FailureKind::AgentInvoke, e.to_string()),
        };
        result.duration_secs = start.elapsed().as_secs_f64();

        if result.status == StepStatus::Succeeded {
            bind_outputs(step, ctx, &mut result);
        }
        result
    }

    fn log_step(&self, result: &StepResult) {
        tracing::info!(
            step = %result.step_id,
            status = ?result.status,
            exit_code = ?result.exit_code,
            duration_secs = result.duration_secs,
            "step finished"
        );
        if let Some(log) = &self.session_log {
            log.append(
                "step",
                serde_json::json!({
                    "step_id": result.step_id,
                    "status": result.status,
                    "exit_code": result.exit_code,
                    "duration_secs": result.duration_secs,
                    "failure": result.failure,
                }),
            );
        }
    }
}

/// Evaluate and assign each `set` entry in declared order.
fn run_set_step(step: &Step, ctx: &mut RecipeContext) -> StepResult {
    let Some(set) = step.set.as_ref() else {
        return StepResult::failed(
            &step.id,
            FailureKind::Expression,
            "set_context step has no `set` map",
        );
    };
    let start = Instant::now();
    let mut delta = IndexMap::new();
    for (key, expression) in set {
        let value = match ctx.evaluate(expression) {
            Ok(v) => v,
            Err(e) => {
                return StepResult::failed(&step.id, FailureKind::Expression, e.to_string());
            }
        };
        if let Err(e) = ctx.set(key.clone(), value.clone()) {
            return StepResult::failed(&step.id, FailureKind::Expression, e.to_string());
        }
        delta.insert(key.clone(), value);
    }
    let mut result = StepResult::bare(&step.id, StepStatus::Succeeded);
    result.duration_secs = start.elapsed().as_secs_f64();
    result.context_delta = delta;
    result
}

/// Bind each declared output key to the step's output record.
fn bind_outputs(step: &Step, ctx: &mut RecipeContext, result: &mut StepResult) {
    for key in &step.outputs {
        let mut record = IndexMap::new();
        record.insert(
            "stdout".to_string(),
            Value::from(result.stdout.trim_end_matches('\n').to_string()),
        );
        record.insert("stderr".to_string(), Value::from(result.stderr.clone()));
        record.insert(
            "exit_code".to_string(),
            result.exit_code.map_or(Value::Null, |c| Value::Int(c as i64)),
        );
        record.insert("success".to_string(), Value::Bool(true));
        let value = Value::Map(record);
        if ctx.set(key.clone(), value.clone()).is_ok() {
            result.context_delta.insert(key.clone(), value);
        }
    }
}

fn template_failure(step: &Step, e: TemplateError) -> StepResult {
    StepResult::failed(&step.id, FailureKind::Template, e.to_string())
}

/// Map adapter errors to step failure records, preserving partial output.
fn subprocess_failure(step: &Step, argv: &[String], e: SubprocessError) -> StepResult {
    let message = e.to_string();
    let (kind, stdout, stderr, exit_code) = match e {
        SubprocessError::SpawnFailed { .. } => {
            (FailureKind::SpawnFailed, String::new(), String::new(), None)
        }
        SubprocessError::Timeout { stdout, stderr, .. } => {
            (FailureKind::Timeout, stdout, stderr, None)
        }
        SubprocessError::NonZeroExit {
            exit_code,
            stdout,
            stderr,
            ..
        } => (FailureKind::NonZeroExit, stdout, stderr, Some(exit_code)),
        SubprocessError::Crashed { stdout, stderr, .. } => {
            (FailureKind::Crashed, stdout, stderr, None)
        }
        SubprocessError::Io { .. } => {
            (FailureKind::SpawnFailed, String::new(), String::new(), None)
        }
    };
    let mut result = StepResult::failed(
        &step.id,
        kind,
        format!("{} (argv: {:?})", message, argv),
    );
    result.stdout = stdout;
    result.stderr = stderr;
    result.exit_code = exit_code;
    result
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
