// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake agent invoker for tests.

use crate::invoker::{AgentInvoker, InvokeError, InvokeOutput, InvokeRequest};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Scripted invoker that records every call.
///
/// Queued responses are returned in order; once the queue is empty every
/// call succeeds with a canned "ok" output.
#[derive(Default)]
pub struct FakeInvoker {
    calls: Mutex<Vec<InvokeRequest>>,
    responses: Mutex<VecDeque<Result<InvokeOutput, InvokeError>>>,
}

impl FakeInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub fn push_output(&self, output: impl Into<String>, success: bool) {
        self.responses.lock().push_back(Ok(InvokeOutput {
            output: output.into(),
            success,
        }));
    }

    /// Queue a failed invocation.
    pub fn push_error(&self, message: impl Into<String>) {
        self.responses
            .lock()
            .push_back(Err(InvokeError::Failed(message.into())));
    }

    /// All requests seen so far.
    pub fn calls(&self) -> Vec<InvokeRequest> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl AgentInvoker for FakeInvoker {
    async fn invoke(&self, request: InvokeRequest) -> Result<InvokeOutput, InvokeError> {
        self.calls.lock().push(request);
        self.responses.lock().pop_front().unwrap_or(Ok(InvokeOutput {
            output: "ok".to_string(),
            success: true,
        }))
    }
}
