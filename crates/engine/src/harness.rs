// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Rollout Contributors

//! Worker-thread harness realized as a `tokio::task::spawn`'d task, carrying
//! the caller's `tracing::Span` with it (`Instrument`) the way the
//! surrounding crates spawn background filesystem/agent work.

use crate::failure::TaskFailure;
use ro_core::SignalHandle;
use std::future::Future;
use std::time::Duration;
use tracing::Instrument;

/// Polling interval `wait` uses to check whether the worker has finished.
/// Not a timeout — `wait` loops until the worker actually completes.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// A handle to a spawned worker. The worker captures any failure into its
/// result rather than unwinding across the task boundary.
pub struct ThreadHarness {
    handle: tokio::task::JoinHandle<Option<TaskFailure>>,
}

impl ThreadHarness {
    /// Spawn `fut` on a fresh tokio task, instrumented with the calling
    /// task's current span so log records keep their rollout/task/action
    /// fields.
    pub fn spawn<F>(fut: F) -> Self
    where
        F: Future<Output = Result<(), TaskFailure>> + Send + 'static,
    {
        let span = tracing::Span::current();
        let handle = tokio::spawn(
            async move {
                match fut.await {
                    Ok(()) => None,
                    Err(failure) => Some(failure),
                }
            }
            .instrument(span),
        );
        Self { handle }
    }

    /// Block until the worker exits, polling once per second. Cancellation
    /// is cooperative: this never aborts the worker, it only observes it.
    /// Any captured failure — whether the action raised or the join itself
    /// failed (e.g. a panic) — sets `abort` before being returned: this is
    /// the "setting the parent abort signal is the default propagation"
    /// rule every `run_threaded`/`revert_threaded` dispatch follows.
    pub async fn wait(mut self, abort: &SignalHandle) -> Option<TaskFailure> {
        loop {
            match tokio::time::timeout(POLL_INTERVAL, &mut self.handle).await {
                Ok(Ok(None)) => return None,
                Ok(Ok(Some(failure))) => {
                    abort.set();
                    return Some(failure);
                }
                Ok(Err(join_err)) => {
                    abort.set();
                    return Some(TaskFailure::from_join_error(&join_err));
                }
                Err(_elapsed) => continue,
            }
        }
    }
}

#[cfg(test)]
#[path = "harness_tests.rs"]
mod tests;
