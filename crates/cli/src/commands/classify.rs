// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sf classify`: run the session-start gate from the command line.

use crate::output::{to_machine_string, OutputFormat};
use anyhow::Result;
use clap::Args;
use sf_adapters::invoker::{AgentInvoker, CommandInvoker, NullInvoker};
use sf_core::{SessionId, SessionRequest};
use sf_engine::{ExecutionTierCascade, RecipeRunner, SessionGate, WorkflowClassifier};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args)]
pub struct ClassifyArgs {
    /// The request text to classify
    prompt: Vec<String>,

    /// Session identifier (generated when omitted)
    #[arg(long, value_name = "ID")]
    session_id: Option<String>,

    /// Treat as a follow-up message instead of the session's first
    #[arg(long)]
    follow_up: bool,

    /// Mark the request as an explicit command (bypasses classification)
    #[arg(long)]
    explicit_command: bool,

    /// Recipe directory; when it exists, Tier 1 execution is wired in
    #[arg(long, default_value = ".sf/recipes", value_name = "DIR")]
    recipe_dir: PathBuf,

    /// Directory for the per-session activity log
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,
}

pub async fn handle(args: ClassifyArgs, format: OutputFormat) -> Result<i32> {
    let request = SessionRequest {
        prompt: args.prompt.join(" "),
        session_id: args
            .session_id
            .map(SessionId::new)
            .unwrap_or_else(SessionId::generate),
        is_first_message: !args.follow_up,
        is_explicit_command: args.explicit_command,
    };

    let mut cascade = ExecutionTierCascade::new();
    if args.recipe_dir.is_dir() {
        let invoker: Arc<dyn AgentInvoker> = match CommandInvoker::from_env() {
            Some(invoker) => Arc::new(invoker),
            None => Arc::new(NullInvoker),
        };
        let runner = RecipeRunner::new(invoker).with_recipe_dir(&args.recipe_dir);
        cascade = cascade.with_recipe_runner(Arc::new(runner));
    }

    let mut gate = SessionGate::new(WorkflowClassifier::new(), cascade);
    if let Some(dir) = args.log_dir {
        gate = gate.with_log_dir(dir);
    }

    let outcome = gate.process(&request).await;

    match format {
        OutputFormat::Table => {
            if let Some(announcement) = &outcome.announcement {
                println!("{}", announcement);
            } else if outcome.bypassed {
                println!(
                    "classification bypassed ({})",
                    outcome.reason.as_deref().unwrap_or("unknown")
                );
            } else {
                println!("classification skipped");
            }
            if let Some(error) = &outcome.execution_error {
                eprintln!("execution error: {}", error);
            }
        }
        machine => println!("{}", to_machine_string(&outcome, machine)?),
    }

    // Fail-open surface: the session continues regardless.
    Ok(0)
}
