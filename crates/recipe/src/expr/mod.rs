// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The sandboxed expression language.
//!
//! A purpose-built lexer, recursive-descent parser, and evaluator. The
//! grammar is exactly the whitelist: literals, names, dotted/indexed access,
//! arithmetic, comparisons, boolean logic, membership, null checks, and the
//! conditional expression. Everything else — calls, lambdas, comprehensions,
//! assignment expressions, imports, starred expressions, dunder names — is
//! rejected at parse time, so there is no host-language feature left to
//! forget to block.

mod ast;
mod eval;
mod lexer;
mod parser;

pub use ast::{BinOp, CmpOp, Expr, UnaryOp};

use sf_core::Value;
use thiserror::Error;

/// Variable lookup interface for the evaluator.
pub trait Scope {
    /// Resolve a bare name to a value, or `None` if undefined.
    fn lookup(&self, name: &str) -> Option<Value>;
}

/// Empty scope, for evaluating constant expressions.
pub struct EmptyScope;

impl Scope for EmptyScope {
    fn lookup(&self, _name: &str) -> Option<Value> {
        None
    }
}

/// Errors from parsing or evaluating an expression.
#[derive(Debug, Error)]
pub enum ExprError {
    /// Syntax that is parseable in other languages but outside the
    /// whitelist here.
    #[error("{construct} is not allowed in expression `{expression}`")]
    NotAllowed {
        expression: String,
        construct: String,
    },
    /// Malformed input.
    #[error("invalid expression `{expression}`: {reason}")]
    Invalid { expression: String, reason: String },
    #[error("unknown variable `{name}` in expression `{expression}`")]
    UnknownVariable { expression: String, name: String },
    #[error("type error in expression `{expression}`: {reason}")]
    Type { expression: String, reason: String },
}

impl ExprError {
    /// The undefined name, when this error is an unknown-variable report.
    pub fn unknown_name(&self) -> Option<&str> {
        match self {
            ExprError::UnknownVariable { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Parse an expression without evaluating it.
///
/// Used by recipe validation to surface bad guards and assignments before
/// anything runs.
pub fn parse(input: &str) -> Result<Expr, ExprError> {
    let tokens = lexer::lex(input)?;
    parser::Parser::new(input, tokens).parse()
}

/// Parse and evaluate an expression against `scope`.
pub fn evaluate(input: &str, scope: &dyn Scope) -> Result<Value, ExprError> {
    let expr = parse(input)?;
    eval::evaluate(&expr, scope, input)
}

#[cfg(test)]
#[path = "expr_tests.rs"]
mod tests;
