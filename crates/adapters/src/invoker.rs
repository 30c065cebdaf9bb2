// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent invocation adapters.
//!
//! The recipe runner resolves an agent reference to its description text
//! and hands it to an [`AgentInvoker`]. The invoker is the seam to the
//! hosting environment: the engine never talks to an LLM itself.

use crate::subprocess::{spawn, SpawnSpec};
use crate::env;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// One agent invocation: the resolved agent description plus the rendered
/// prompt.
#[derive(Debug, Clone)]
pub struct InvokeRequest {
    pub agent_content: String,
    pub prompt: String,
}

/// Invoker output: stdout-like text and a success flag.
#[derive(Debug, Clone)]
pub struct InvokeOutput {
    pub output: String,
    pub success: bool,
}

/// Errors from agent invocation.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("no agent invoker configured (set SF_AGENT_CMD or inject one)")]
    NotConfigured,
    #[error("agent invocation failed: {0}")]
    Failed(String),
}

/// Adapter that executes agent invocations.
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    async fn invoke(&self, request: InvokeRequest) -> Result<InvokeOutput, InvokeError>;
}

/// Invoker used when nothing is configured: every invocation fails softly
/// with a pointer to the configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullInvoker;

#[async_trait]
impl AgentInvoker for NullInvoker {
    async fn invoke(&self, _request: InvokeRequest) -> Result<InvokeOutput, InvokeError> {
        Err(InvokeError::NotConfigured)
    }
}

/// Invoker that pipes the agent description and prompt to an external
/// command (e.g. an LLM CLI) and reads its stdout.
#[derive(Debug, Clone)]
pub struct CommandInvoker {
    argv: Vec<String>,
    timeout: Duration,
}

impl CommandInvoker {
    pub fn new(argv: Vec<String>) -> Self {
        Self {
            argv,
            timeout: env::AGENT_INVOKE_TIMEOUT,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build from the `SF_AGENT_CMD` environment variable
    /// (whitespace-separated argv), if set and non-empty.
    pub fn from_env() -> Option<Self> {
        let raw = std::env::var("SF_AGENT_CMD").ok()?;
        let argv: Vec<String> = raw.split_whitespace().map(String::from).collect();
        if argv.is_empty() {
            return None;
        }
        Some(Self::new(argv))
    }
}

#[async_trait]
impl AgentInvoker for CommandInvoker {
    async fn invoke(&self, request: InvokeRequest) -> Result<InvokeOutput, InvokeError> {
        let input = format!("{}\n\n{}", request.agent_content, request.prompt);
        let spec = SpawnSpec::new(self.argv.clone())
            .timeout(self.timeout)
            .non_interactive(true)
            .input(input);
        let result = spawn(spec)
            .await
            .map_err(|e| InvokeError::Failed(e.to_string()))?;
        Ok(InvokeOutput {
            output: result.stdout,
            success: result.success,
        })
    }
}

#[cfg(test)]
#[path = "invoker_tests.rs"]
mod tests;
