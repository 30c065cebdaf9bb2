//! Test helpers for behavioral specifications.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};

pub use assert_cmd::Command;

/// Locates the `sf` binary built alongside this test.
///
/// The test crate lives in the workspace root package, which has no `sf`
/// binary target of its own, so `CARGO_BIN_EXE_sf` (set by Cargo only for
/// binaries belonging to the package under test) is unavailable here. The
/// `sf` executable still lands next to this test binary's profile
/// directory, so derive it from `current_exe` instead.
fn sf_binary_path() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_sf") {
        return PathBuf::from(path);
    }
    let mut dir = std::env::current_exe().expect("current test exe path");
    dir.pop(); // deps
    dir.pop(); // profile dir (debug/release)
    dir.join("sf")
}

/// Returns a Command configured to run the sf binary.
pub fn sf_cmd() -> Command {
    let mut cmd = Command::new(sf_binary_path());
    // Keep specs hermetic: no tier-1 surprises from the caller's env.
    cmd.env_remove("SF_USE_RECIPES");
    cmd.env_remove("SF_AGENT_CMD");
    cmd
}

/// A temporary project directory with helpers for writing fixtures.
pub struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file, creating parent directories.
    pub fn file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    /// sf invocation rooted at this project.
    pub fn sf(&self) -> Command {
        let mut cmd = sf_cmd();
        cmd.current_dir(self.dir.path());
        cmd
    }
}

/// A minimal recipe that succeeds.
pub const MINIMAL_RECIPE: &str = r#"
name: minimal
steps:
  - id: ok
    kind: shell
    command: "echo done"
"#;

/// A recipe exercising context, templates, and set_context.
pub const CONTEXT_RECIPE: &str = r#"
name: context-demo
version: "1.0"
description: Demonstrates context propagation
tags: [demo]
context:
  who: recipe-default
steps:
  - id: greet
    kind: shell
    command: "echo hello {{who}}"
    outputs: [greet_run]
  - id: note
    kind: set_context
    set:
      greeted: "true"
"#;
