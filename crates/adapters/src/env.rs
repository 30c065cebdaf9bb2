// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment-derived defaults for spawned processes.
//!
//! Values are read fresh on every call; nothing here is cached.

use std::time::Duration;

/// Default timeout for recipe shell steps. A safety net for long-running
/// user scripts, not a target.
pub const SHELL_STEP_TIMEOUT: Duration = Duration::from_secs(600);

/// Shell step timeout under CI.
pub const SHELL_STEP_TIMEOUT_CI: Duration = Duration::from_secs(120);

/// Default timeout for agent invocations.
pub const AGENT_INVOKE_TIMEOUT: Duration = Duration::from_secs(300);

/// Whether this run is in CI (the conventional `CI` variable is set and
/// not "0").
pub fn is_ci() -> bool {
    std::env::var("CI")
        .map(|v| !v.is_empty() && v != "0")
        .unwrap_or(false)
}

/// Default shell step timeout, shortened under CI.
pub fn default_step_timeout() -> Duration {
    if is_ci() {
        SHELL_STEP_TIMEOUT_CI
    } else {
        SHELL_STEP_TIMEOUT
    }
}

/// Grace period between soft termination and hard kill.
pub fn grace_period() -> Duration {
    if is_ci() {
        Duration::from_secs(2)
    } else {
        Duration::from_secs(5)
    }
}

/// Environment that suppresses interactive prompts in common tools, so a
/// child never hangs waiting for credentials on a terminal nobody watches.
pub fn non_interactive_env() -> &'static [(&'static str, &'static str)] {
    &[
        ("GIT_TERMINAL_PROMPT", "0"),
        ("GCM_INTERACTIVE", "Never"),
        ("DEBIAN_FRONTEND", "noninteractive"),
        ("PIP_NO_INPUT", "1"),
    ]
}
