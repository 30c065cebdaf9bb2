// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use thiserror::Error;

/// Errors that can occur in the engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("recipe not found: {0}")]
    RecipeNotFound(String),
    #[error("recipe `{name}` failed: {detail}")]
    RecipeFailed { name: String, detail: String },
    #[error(transparent)]
    Parse(#[from] sf_recipe::ParseError),
    #[error(transparent)]
    Find(#[from] sf_recipe::FindError),
    #[error("all execution tiers failed: {0}")]
    TierExhausted(String),
}
