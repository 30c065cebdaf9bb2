// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-run value store for template substitution and expression
//! evaluation.

use crate::expr::{self, ExprError, Scope};
use crate::model::CONTEXT_KEY_PATTERN;
use crate::template::{self, TemplateError};
use indexmap::IndexMap;
use sf_core::Value;
use thiserror::Error;

/// Errors from context mutation.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("invalid context key `{key}`")]
    InvalidKey { key: String },
}

/// Mutable key→value store owned by exactly one recipe run.
///
/// Lookup has two distinct surfaces:
///
/// - a bare key (`branch`) reads the flat entry of that name;
/// - a dotted key (`sync.exit_code`) navigates nested maps from the first
///   segment, and only ever walks maps — a flat entry whose *name* contains
///   a dot (legal, since keys are free-form strings) can never shadow or be
///   shadowed by map navigation.
#[derive(Debug, Clone, Default)]
pub struct RecipeContext {
    vars: IndexMap<String, Value>,
}

impl RecipeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(vars: IndexMap<String, Value>) -> Self {
        Self { vars }
    }

    /// Look up a value by bare or dotted key. See the type docs for the
    /// navigation rules.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match key.split_once('.') {
            None => self.vars.get(key),
            Some((root, rest)) => {
                let mut current = self.vars.get(root)?;
                for segment in rest.split('.') {
                    current = current.as_map()?.get(segment)?;
                }
                Some(current)
            }
        }
    }

    /// Look up a flat entry only, dotted names included.
    pub fn get_flat(&self, key: &str) -> Option<&Value> {
        self.vars.get(key)
    }

    /// Insert or replace a flat entry.
    ///
    /// Keys must match `[a-zA-Z_][a-zA-Z0-9_.]*`.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Result<(), ContextError> {
        let key = key.into();
        if !CONTEXT_KEY_PATTERN.is_match(&key) {
            return Err(ContextError::InvalidKey { key });
        }
        self.vars.insert(key, value);
        Ok(())
    }

    /// Merge `other` in at higher priority: per-top-level-key replace.
    ///
    /// Nested maps replace whole; there is deliberately no deep merge.
    pub fn merge_replace(&mut self, other: &IndexMap<String, Value>) {
        for (k, v) in other {
            self.vars.insert(k.clone(), v.clone());
        }
    }

    pub fn vars(&self) -> &IndexMap<String, Value> {
        &self.vars
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Clone the current state, for snapshots in results and diagnostics.
    pub fn snapshot(&self) -> IndexMap<String, Value> {
        self.vars.clone()
    }

    /// Evaluate a sandboxed expression against this context.
    pub fn evaluate(&self, expression: &str) -> Result<Value, ExprError> {
        expr::evaluate(expression, self)
    }

    /// Render a `{{ expr }}` template with plain substitution.
    pub fn render(&self, template_text: &str) -> Result<String, TemplateError> {
        template::render(template_text, self)
    }

    /// Render a `{{ expr }}` template with shell-quoted substitution.
    pub fn render_shell(&self, template_text: &str) -> Result<String, TemplateError> {
        template::render_shell(template_text, self)
    }
}

impl Scope for RecipeContext {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.vars.get(name).cloned()
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
