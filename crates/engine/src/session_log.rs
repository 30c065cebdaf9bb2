// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only per-session activity log.
//!
//! One JSONL file per session; one entry per classification, spawn, and
//! step. Each `append()` opens, writes, and closes the file — safe for the
//! low write frequency of session events. Failures are logged via tracing
//! but never propagate: logging must not break the engine.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writer for one session's activity log.
#[derive(Debug, Clone)]
pub struct SessionLogger {
    path: PathBuf,
}

impl SessionLogger {
    /// Log into `<log_dir>/<session_id>.jsonl`.
    pub fn for_session(log_dir: impl Into<PathBuf>, session_id: &str) -> Self {
        Self {
            path: log_dir.into().join(format!("{}.jsonl", session_id)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry. `payload` fields are merged beside `ts_ms` and
    /// `kind`.
    pub fn append(&self, kind: &str, payload: serde_json::Value) {
        let mut entry = serde_json::json!({
            "ts_ms": epoch_ms(),
            "kind": kind,
        });
        if let (Some(obj), serde_json::Value::Object(extra)) = (entry.as_object_mut(), payload) {
            obj.extend(extra);
        }
        if let Err(e) = self.write_line(&entry) {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to write session log"
            );
        }
    }

    fn write_line(&self, entry: &serde_json::Value) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

fn epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
