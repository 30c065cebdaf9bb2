// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sf recipe` subcommands: run, list, validate, show.

use crate::output::{to_machine_string, OutputFormat};
use crate::table::Table;
use anyhow::Result;
use clap::{Args, Subcommand};
use indexmap::IndexMap;
use sf_adapters::invoker::{AgentInvoker, CommandInvoker, NullInvoker};
use sf_core::{RecipeResult, SessionId, StepStatus, Value};
use sf_engine::{InterruptHandle, RecipeRunner, RunOptions, SessionLogger};
use sf_recipe::find::collect_all_recipes;
use sf_recipe::model::Recipe;
use sf_recipe::parser::parse_recipe_file;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args)]
pub struct RecipeArgs {
    #[command(subcommand)]
    command: RecipeCommands,
}

#[derive(Subcommand)]
enum RecipeCommands {
    /// Execute a recipe file
    Run {
        /// Path to the recipe (.yaml, .toml, or .json)
        path: PathBuf,
        /// Context overrides (can be repeated: --context key=value)
        #[arg(long = "context", value_name = "K=V", value_parser = parse_key_value)]
        context: Vec<(String, String)>,
        /// Record synthetic results without executing anything
        #[arg(long)]
        dry_run: bool,
        /// Print per-step detail as the run progresses
        #[arg(short, long)]
        verbose: bool,
        /// Directory for the per-session activity log
        #[arg(long, value_name = "DIR")]
        log_dir: Option<PathBuf>,
    },
    /// List recipes in a directory
    List {
        #[arg(long, default_value = ".sf/recipes", value_name = "DIR")]
        recipe_dir: PathBuf,
        /// Only recipes carrying all of these tags (can be repeated)
        #[arg(long = "tags", value_name = "TAG")]
        tags: Vec<String>,
    },
    /// Parse and validate a recipe file
    Validate {
        path: PathBuf,
        #[arg(short, long)]
        verbose: bool,
    },
    /// Show a recipe's metadata
    Show {
        path: PathBuf,
        /// Include the step list
        #[arg(long)]
        steps: bool,
        /// Include the context defaults
        #[arg(long)]
        context: bool,
    },
}

/// Parse a `key=value` pair.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got `{}`", s)),
    }
}

pub async fn handle(
    args: RecipeArgs,
    format: OutputFormat,
    interrupt: InterruptHandle,
) -> Result<i32> {
    match args.command {
        RecipeCommands::Run {
            path,
            context,
            dry_run,
            verbose,
            log_dir,
        } => run(path, context, dry_run, verbose, log_dir, format, interrupt).await,
        RecipeCommands::List { recipe_dir, tags } => list(recipe_dir, tags, format),
        RecipeCommands::Validate { path, verbose } => validate(path, verbose, format),
        RecipeCommands::Show {
            path,
            steps,
            context,
        } => show(path, steps, context, format),
    }
}

async fn run(
    path: PathBuf,
    context: Vec<(String, String)>,
    dry_run: bool,
    verbose: bool,
    log_dir: Option<PathBuf>,
    format: OutputFormat,
    interrupt: InterruptHandle,
) -> Result<i32> {
    let recipe = match parse_recipe_file(&path) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(1);
        }
    };

    let user_context = build_user_context(context);
    let invoker: Arc<dyn AgentInvoker> = match CommandInvoker::from_env() {
        Some(invoker) => Arc::new(invoker),
        None => Arc::new(NullInvoker),
    };
    let mut runner = RecipeRunner::new(invoker).with_interrupt(interrupt);
    if let Some(dir) = log_dir {
        let session_id = SessionId::generate();
        runner = runner.with_session_log(SessionLogger::for_session(dir, &session_id));
    }

    let options = RunOptions {
        dry_run,
        working_dir: None,
        verbose,
    };
    let result = runner.run(&recipe, user_context, &options).await;

    match format {
        OutputFormat::Table => print_run_table(&result, verbose),
        machine => println!("{}", to_machine_string(&result, machine)?),
    }

    if result.interrupted {
        return Ok(130);
    }
    Ok(if result.success { 0 } else { 1 })
}

/// Values parse as JSON when they parse, else as strings, so
/// `--context n=3` is a number and `--context branch=main` is a string.
fn build_user_context(pairs: Vec<(String, String)>) -> IndexMap<String, Value> {
    pairs
        .into_iter()
        .map(|(key, raw)| {
            let value = serde_json::from_str::<serde_json::Value>(&raw)
                .map(Value::from)
                .unwrap_or_else(|_| Value::from(raw));
            (key, value)
        })
        .collect()
}

fn print_run_table(result: &RecipeResult, verbose: bool) {
    let mut table = Table::new(vec!["STEP", "STATUS", "EXIT", "DURATION"]);
    for step in &result.step_results {
        table.row(vec![
            step.step_id.clone(),
            status_label(step.status).to_string(),
            step.exit_code.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()),
            format!("{:.2}s", step.duration_secs),
        ]);
    }
    print!("{}", table.render());

    if verbose {
        for step in &result.step_results {
            if let Some(failure) = &step.failure {
                println!("\n{}: {}", step.step_id, failure.message);
            }
            if !step.stdout.is_empty() {
                println!("\n--- {} stdout ---\n{}", step.step_id, step.stdout.trim_end());
            }
            if !step.stderr.is_empty() {
                println!("\n--- {} stderr ---\n{}", step.step_id, step.stderr.trim_end());
            }
        }
    } else if let Some(failed) = result.step_results.iter().find(|s| s.is_failure()) {
        if let Some(failure) = &failed.failure {
            eprintln!("step `{}` failed: {}", failed.step_id, failure.message);
        }
    }

    let verdict = if result.interrupted {
        "interrupted"
    } else if result.success {
        "ok"
    } else {
        "failed"
    };
    println!(
        "\n{}: {} ({} step(s), {:.2}s)",
        result.recipe_name,
        verdict,
        result.step_results.len(),
        result.duration_secs
    );
}

fn status_label(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Succeeded => "ok",
        StepStatus::Failed => "failed",
        StepStatus::Skipped => "skipped",
        StepStatus::DryRun => "dry-run",
        StepStatus::Interrupted => "interrupted",
    }
}

fn list(recipe_dir: PathBuf, tags: Vec<String>, format: OutputFormat) -> Result<i32> {
    let recipes = collect_all_recipes(&recipe_dir)?;
    let filtered: Vec<_> = recipes
        .into_iter()
        .filter(|(recipe, _)| tags.iter().all(|t| recipe.tags.contains(t)))
        .collect();

    match format {
        OutputFormat::Table => {
            if filtered.is_empty() {
                eprintln!("No recipes found in {}", recipe_dir.display());
                return Ok(0);
            }
            let mut table = Table::new(vec!["NAME", "VERSION", "STEPS", "TAGS", "DESCRIPTION"]);
            for (recipe, _path) in &filtered {
                table.row(vec![
                    recipe.name.clone(),
                    recipe.version.clone().unwrap_or_else(|| "-".to_string()),
                    recipe.step_count().to_string(),
                    recipe.tags.join(","),
                    recipe.description.clone().unwrap_or_default(),
                ]);
            }
            print!("{}", table.render());
        }
        machine => {
            let entries: Vec<serde_json::Value> = filtered
                .iter()
                .map(|(recipe, path)| {
                    serde_json::json!({
                        "name": recipe.name,
                        "version": recipe.version,
                        "steps": recipe.step_count(),
                        "tags": recipe.tags,
                        "description": recipe.description,
                        "path": path.display().to_string(),
                    })
                })
                .collect();
            println!("{}", to_machine_string(&entries, machine)?);
        }
    }
    Ok(0)
}

fn validate(path: PathBuf, verbose: bool, format: OutputFormat) -> Result<i32> {
    match parse_recipe_file(&path) {
        Ok(recipe) => {
            match format {
                OutputFormat::Table => {
                    println!("{}: valid", path.display());
                    if verbose {
                        println!("  name: {}", recipe.name);
                        if let Some(version) = &recipe.version {
                            println!("  version: {}", version);
                        }
                        println!("  steps: {}", recipe.step_count());
                    }
                }
                machine => {
                    let report = serde_json::json!({
                        "path": path.display().to_string(),
                        "valid": true,
                        "name": recipe.name,
                        "steps": recipe.step_count(),
                    });
                    println!("{}", to_machine_string(&report, machine)?);
                }
            }
            Ok(0)
        }
        Err(e) => {
            match format {
                OutputFormat::Table => eprintln!("Error: {}", e),
                machine => {
                    let report = serde_json::json!({
                        "path": path.display().to_string(),
                        "valid": false,
                        "error": e.to_string(),
                    });
                    println!("{}", to_machine_string(&report, machine)?);
                }
            }
            Ok(1)
        }
    }
}

fn show(path: PathBuf, steps: bool, context: bool, format: OutputFormat) -> Result<i32> {
    let recipe = match parse_recipe_file(&path) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(1);
        }
    };

    match format {
        OutputFormat::Table => print_show_table(&recipe, steps, context),
        machine => println!("{}", to_machine_string(&recipe, machine)?),
    }
    Ok(0)
}

fn print_show_table(recipe: &Recipe, steps: bool, context: bool) {
    println!("name: {}", recipe.name);
    if let Some(version) = &recipe.version {
        println!("version: {}", version);
    }
    if let Some(description) = &recipe.description {
        println!("description: {}", description);
    }
    if !recipe.tags.is_empty() {
        println!("tags: {}", recipe.tags.join(", "));
    }
    println!("steps: {}", recipe.step_count());

    if context && !recipe.context.is_empty() {
        println!("\ncontext defaults:");
        for (key, value) in &recipe.context {
            println!("  {} = {}", key, value);
        }
    }

    if steps {
        println!();
        let mut table = Table::new(vec!["ID", "KIND", "DETAIL"]);
        for step in &recipe.steps {
            table.row(vec![
                step.id.clone(),
                step.kind.to_string(),
                step_detail(step),
            ]);
        }
        print!("{}", table.render());
    }
}

fn step_detail(step: &sf_recipe::model::Step) -> String {
    match step.kind {
        sf_recipe::model::StepKind::Shell => step
            .command
            .clone()
            .or_else(|| step.argv.as_ref().map(|a| a.join(" ")))
            .unwrap_or_default(),
        sf_recipe::model::StepKind::AgentInvoke => step.agent.clone().unwrap_or_default(),
        sf_recipe::model::StepKind::SetContext => step
            .set
            .as_ref()
            .map(|s| s.keys().cloned().collect::<Vec<_>>().join(", "))
            .unwrap_or_default(),
        sf_recipe::model::StepKind::Conditional => {
            format!("when {}", step.when.clone().unwrap_or_default())
        }
    }
}

#[cfg(test)]
#[path = "recipe_tests.rs"]
mod tests;
