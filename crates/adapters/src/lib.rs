// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sf-adapters: the subprocess adapter and the agent invoker seam.

pub mod env;
pub mod invoker;
pub mod subprocess;

pub use invoker::{AgentInvoker, CommandInvoker, InvokeError, InvokeOutput, InvokeRequest, NullInvoker};
pub use subprocess::{spawn, SpawnSpec, SubprocessError, SubprocessResult};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeInvoker;
