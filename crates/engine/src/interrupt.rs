// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cooperative interrupt signalling for recipe runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Cloneable handle that signals a run to stop.
///
/// The runner checks it between steps and races it against in-flight
/// subprocess and agent work; the CLI wires it to ctrl-c.
#[derive(Clone, Default)]
pub struct InterruptHandle {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    flag: AtomicBool,
    notify: Notify,
}

impl InterruptHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal the interrupt. Idempotent.
    pub fn interrupt(&self) {
        self.inner.flag.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_interrupted(&self) -> bool {
        self.inner.flag.load(Ordering::SeqCst)
    }

    /// Resolve once the interrupt has been signalled.
    pub async fn interrupted(&self) {
        while !self.is_interrupted() {
            let notified = self.inner.notify.notified();
            if self.is_interrupted() {
                break;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn wakes_waiters_and_stays_set() {
        let handle = InterruptHandle::new();
        assert!(!handle.is_interrupted());

        let waiter = handle.clone();
        let task = tokio::spawn(async move { waiter.interrupted().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.interrupt();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
        assert!(handle.is_interrupted());

        // Late waiters resolve immediately.
        tokio::time::timeout(Duration::from_secs(1), handle.interrupted())
            .await
            .unwrap();
    }
}
