// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recipe parsing (YAML, TOML, and JSON)

use crate::expr;
use crate::model::{Recipe, Step, StepKind, CONTEXT_KEY_PATTERN, STEP_ID_PATTERN};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Recipe file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Format {
    Yaml,
    Toml,
    Json,
}

impl Format {
    /// Detect the format from a file extension.
    pub fn for_path(path: &Path) -> Option<Format> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Some(Format::Yaml),
            Some("toml") => Some(Format::Toml),
            Some("json") => Some(Format::Json),
            _ => None,
        }
    }
}

/// Errors that can occur during recipe parsing
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("YAML parse error in {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("TOML parse error in {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("JSON parse error in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported recipe format: {path} (expected .yaml, .yml, .toml, or .json)")]
    UnsupportedFormat { path: String },

    #[error("invalid recipe field `{field}` in {path}: {message}")]
    InvalidField {
        path: String,
        field: String,
        message: String,
    },

    #[error("cannot read recipe file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Parse and validate a recipe file, detecting the format from the
/// extension.
pub fn parse_recipe_file(path: &Path) -> Result<Recipe, ParseError> {
    let format = Format::for_path(path).ok_or_else(|| ParseError::UnsupportedFormat {
        path: path.display().to_string(),
    })?;
    let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_recipe_with_format(&content, format, &path.display().to_string())
}

/// Parse and validate recipe content in the given format. `origin` names
/// the source (file path or `<inline>`) for error messages.
pub fn parse_recipe_with_format(
    content: &str,
    format: Format,
    origin: &str,
) -> Result<Recipe, ParseError> {
    let recipe: Recipe = match format {
        Format::Yaml => serde_yaml::from_str(content).map_err(|source| ParseError::Yaml {
            path: origin.to_string(),
            source,
        })?,
        Format::Toml => toml::from_str(content).map_err(|source| ParseError::Toml {
            path: origin.to_string(),
            source,
        })?,
        Format::Json => serde_json::from_str(content).map_err(|source| ParseError::Json {
            path: origin.to_string(),
            source,
        })?,
    };
    validate_recipe(&recipe, origin)?;
    Ok(recipe)
}

fn invalid(origin: &str, field: impl Into<String>, message: impl Into<String>) -> ParseError {
    ParseError::InvalidField {
        path: origin.to_string(),
        field: field.into(),
        message: message.into(),
    }
}

/// Semantic validation beyond what serde enforces: non-empty steps,
/// well-formed unique ids, per-kind required fields, parseable guard and
/// assignment expressions.
fn validate_recipe(recipe: &Recipe, origin: &str) -> Result<(), ParseError> {
    if recipe.name.trim().is_empty() {
        return Err(invalid(origin, "name", "must not be empty"));
    }
    if recipe.steps.is_empty() {
        return Err(invalid(origin, "steps", "must contain at least one step"));
    }
    for key in recipe.context.keys() {
        if !CONTEXT_KEY_PATTERN.is_match(key) {
            return Err(invalid(
                origin,
                format!("context.{}", key),
                "invalid context key",
            ));
        }
    }

    let mut seen_ids = HashSet::new();
    for step in &recipe.steps {
        validate_step(step, origin, &mut seen_ids)?;
    }
    Ok(())
}

fn validate_step(
    step: &Step,
    origin: &str,
    seen_ids: &mut HashSet<String>,
) -> Result<(), ParseError> {
    let field = |name: &str| format!("steps.{}.{}", step.id, name);

    if !STEP_ID_PATTERN.is_match(&step.id) {
        return Err(invalid(
            origin,
            format!("steps.{}.id", step.id),
            "step ids must match [a-z0-9][a-z0-9-]*",
        ));
    }
    if !seen_ids.insert(step.id.clone()) {
        return Err(invalid(
            origin,
            field("id"),
            "duplicate step id",
        ));
    }
    if let Some(timeout) = step.timeout_secs {
        if timeout <= 0.0 {
            return Err(invalid(origin, field("timeout_secs"), "must be positive"));
        }
    }
    if let Some(when) = &step.when {
        expr::parse(when).map_err(|e| invalid(origin, field("when"), e.to_string()))?;
    }

    match step.kind {
        StepKind::Shell => {
            let has_argv = step.argv.as_ref().is_some_and(|a| !a.is_empty());
            if step.command.is_none() && !has_argv {
                return Err(invalid(
                    origin,
                    field("command"),
                    "shell steps require `command` or a non-empty `argv`",
                ));
            }
        }
        StepKind::AgentInvoke => {
            if step.agent.is_none() {
                return Err(invalid(
                    origin,
                    field("agent"),
                    "agent_invoke steps require `agent`",
                ));
            }
        }
        StepKind::SetContext => {
            let Some(set) = step.set.as_ref().filter(|s| !s.is_empty()) else {
                return Err(invalid(
                    origin,
                    field("set"),
                    "set_context steps require a non-empty `set` map",
                ));
            };
            for (key, expression) in set {
                if !CONTEXT_KEY_PATTERN.is_match(key) {
                    return Err(invalid(origin, field(&format!("set.{}", key)), "invalid context key"));
                }
                expr::parse(expression)
                    .map_err(|e| invalid(origin, field(&format!("set.{}", key)), e.to_string()))?;
            }
        }
        StepKind::Conditional => {
            if step.when.is_none() {
                return Err(invalid(
                    origin,
                    field("when"),
                    "conditional steps require `when`",
                ));
            }
            let Some(nested) = step.step.as_deref() else {
                return Err(invalid(
                    origin,
                    field("step"),
                    "conditional steps require a nested `step`",
                ));
            };
            validate_step(nested, origin, seen_ids)?;
        }
    }

    for output in &step.outputs {
        if !CONTEXT_KEY_PATTERN.is_match(output) {
            return Err(invalid(
                origin,
                field(&format!("outputs.{}", output)),
                "invalid context key",
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
