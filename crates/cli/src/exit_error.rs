// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Carrier for non-default process exit codes.

/// Error whose only purpose is to select the process exit code.
///
/// Handlers print their own diagnostics; the empty Display keeps `main`
/// from printing a second "Error:" line.
#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
}

impl std::fmt::Display for ExitError {
    fn fmt(&self, _f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Ok(())
    }
}

impl std::error::Error for ExitError {}
