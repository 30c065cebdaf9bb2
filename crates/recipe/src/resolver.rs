// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent reference resolution.
//!
//! Maps a `namespace:name` reference to the content of a human-authored
//! agent description file under one of the configured search roots, with a
//! containment check on the physical path. Resolution is deliberately
//! uncached: every call re-reads the file, so callers never act on stale
//! content (and must not assume stability between resolves).

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

/// Valid namespace and name segments.
#[allow(clippy::expect_used)]
static SEGMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("constant regex pattern is valid"));

/// Errors from agent resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid agent reference `{reference}`: {reason}")]
    InvalidReference { reference: String, reason: String },

    #[error("agent not found: `{reference}` (searched {roots})")]
    NotFound { reference: String, roots: String },
}

/// A validated `namespace:name` agent reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReference {
    pub namespace: String,
    pub name: String,
}

impl AgentReference {
    /// Parse and validate a reference. Exactly one `:`; both segments must
    /// match `[A-Za-z0-9_-]+` (which excludes whitespace, path separators,
    /// dots, null bytes, and all non-ASCII including zero-width characters).
    pub fn parse(reference: &str) -> Result<Self, ResolveError> {
        let invalid = |reason: &str| ResolveError::InvalidReference {
            reference: reference.escape_default().to_string(),
            reason: reason.to_string(),
        };

        let mut parts = reference.split(':');
        let (namespace, name) = match (parts.next(), parts.next(), parts.next()) {
            (Some(ns), Some(name), None) => (ns, name),
            (_, None, _) => return Err(invalid("expected `namespace:name`")),
            _ => return Err(invalid("more than one `:`")),
        };
        if namespace.is_empty() {
            return Err(invalid("empty namespace"));
        }
        if name.is_empty() {
            return Err(invalid("empty name"));
        }
        if !SEGMENT_PATTERN.is_match(namespace) {
            return Err(invalid("namespace must match [A-Za-z0-9_-]+"));
        }
        if !SEGMENT_PATTERN.is_match(name) {
            return Err(invalid("name must match [A-Za-z0-9_-]+"));
        }
        Ok(Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }
}

impl std::fmt::Display for AgentReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

/// Resolves agent references against an ordered list of search roots.
///
/// Layout under each root: `<root>/<namespace>/<category>/<name>.md`,
/// with categories tried in order.
#[derive(Debug, Clone)]
pub struct AgentResolver {
    search_roots: Vec<PathBuf>,
    categories: Vec<String>,
    extension: String,
}

impl Default for AgentResolver {
    /// Project-local agents first, then the user-level directory.
    fn default() -> Self {
        let mut roots = vec![PathBuf::from(".sf/agents")];
        if let Some(home) = dirs::home_dir() {
            roots.push(home.join(".sf/agents"));
        }
        Self::new(roots)
    }
}

impl AgentResolver {
    pub fn new(search_roots: Vec<PathBuf>) -> Self {
        Self {
            search_roots,
            categories: vec![
                "core".to_string(),
                "specialized".to_string(),
                "workflow".to_string(),
            ],
            extension: "md".to_string(),
        }
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    /// Resolve a reference to the raw content of its description file.
    ///
    /// The candidate path is fully resolved (symlinks included) and must
    /// remain inside its resolved search root; escapes are skipped, not
    /// followed. Unreadable or over-long candidates degrade to not-found.
    pub fn resolve(&self, reference: &str) -> Result<String, ResolveError> {
        let parsed = AgentReference::parse(reference)?;

        for root in &self.search_roots {
            let Ok(resolved_root) = root.canonicalize() else {
                continue;
            };
            for category in &self.categories {
                let candidate = root
                    .join(&parsed.namespace)
                    .join(category)
                    .join(format!("{}.{}", parsed.name, self.extension));
                if let Some(content) = read_contained(&candidate, &resolved_root, reference) {
                    return Ok(content);
                }
            }
        }

        Err(ResolveError::NotFound {
            reference: reference.to_string(),
            roots: self
                .search_roots
                .iter()
                .map(|r| r.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}

/// Read `candidate` if its physical path is inside `resolved_root`.
fn read_contained(candidate: &Path, resolved_root: &Path, reference: &str) -> Option<String> {
    let physical = candidate.canonicalize().ok()?;
    if !physical.starts_with(resolved_root) {
        tracing::warn!(
            reference,
            candidate = %candidate.display(),
            physical = %physical.display(),
            "agent path escapes its search root; skipping"
        );
        return None;
    }
    std::fs::read_to_string(&physical).ok()
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
