// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `{{ expr }}` template rendering.
//!
//! Substitution is a single left-to-right pass: substituted values are
//! emitted into the output and never rescanned for further markers, so a
//! value that itself contains `{{ ... }}` renders literally. This is what
//! keeps `user_input = "{{admin_password}}"` from leaking anything.

use crate::context::RecipeContext;
use crate::expr::ExprError;
use thiserror::Error;

/// Errors from template rendering.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("unknown variable `{name}` in template `{template}`")]
    UnknownVariable { template: String, name: String },
    #[error("in template `{template}`: {source}")]
    Expr {
        template: String,
        #[source]
        source: ExprError,
    },
    #[error("unclosed `{{{{` in template `{template}`")]
    Unclosed { template: String },
}

/// Render a template with plain substitution.
///
/// Text outside `{{ ... }}` passes through verbatim; no escaping of any
/// kind is applied. Unknown variables fail with the missing name.
pub fn render(template_text: &str, ctx: &RecipeContext) -> Result<String, TemplateError> {
    render_inner(template_text, ctx, false)
}

/// Render a template, shell-quoting every substituted value.
///
/// Each substitution lands as exactly one shell token; use this when the
/// output is handed to a shell. Prefer split argv and the plain renderer
/// when the step schema allows it.
pub fn render_shell(template_text: &str, ctx: &RecipeContext) -> Result<String, TemplateError> {
    render_inner(template_text, ctx, true)
}

fn render_inner(
    template_text: &str,
    ctx: &RecipeContext,
    shell_quote: bool,
) -> Result<String, TemplateError> {
    let mut output = String::with_capacity(template_text.len());
    let mut rest = template_text;

    while let Some(start) = rest.find("{{") {
        output.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let end = find_marker_end(after_open).ok_or_else(|| TemplateError::Unclosed {
            template: template_text.to_string(),
        })?;
        let expression = after_open[..end].trim();

        let value = ctx.evaluate(expression).map_err(|e| match e {
            ExprError::UnknownVariable { name, .. } => TemplateError::UnknownVariable {
                template: template_text.to_string(),
                name,
            },
            other => TemplateError::Expr {
                template: template_text.to_string(),
                source: other,
            },
        })?;

        let rendered = value.render_string();
        if shell_quote {
            output.push_str(&quote_shell(&rendered));
        } else {
            output.push_str(&rendered);
        }
        rest = &after_open[end + 2..];
    }

    output.push_str(rest);
    Ok(output)
}

/// Find the offset of the closing `}}` for an expression that starts at the
/// beginning of `s`.
///
/// Tracks string literals and brace/bracket depth so map literals and
/// braces inside quoted strings don't end the marker early.
fn find_marker_end(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1; // skip escaped char
                } else if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'\'' | b'"' => quote = Some(b),
                b'{' | b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                b'}' => {
                    if depth == 0 {
                        if bytes.get(i + 1) == Some(&b'}') {
                            return Some(i);
                        }
                        // Lone `}` at depth 0: part of the expression text;
                        // the expression parser will report it.
                    } else {
                        depth -= 1;
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }
    None
}

/// Characters that never need quoting in a POSIX shell word.
fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '@' | '%' | '+' | '=' | ':' | ',' | '.' | '/' | '-')
}

/// Quote a string so a POSIX shell reads it back as a single token with
/// the exact original value.
///
/// The single-quote strategy: wrap the whole value in `'...'` and rewrite
/// each embedded `'` as `'\''`. Every metacharacter — `;`, `|`, `&`,
/// backticks, `$`, parens, redirects, globs, tildes, braces, whitespace,
/// control characters — is inert inside single quotes.
pub fn quote_shell(s: &str) -> String {
    if !s.is_empty() && s.chars().all(is_shell_safe) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(c);
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
