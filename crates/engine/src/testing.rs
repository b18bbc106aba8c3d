// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Rollout Contributors

//! Leaf task behaviors used only by test suites — this crate's own, and
//! downstream crates' via the `test-support` feature.

use crate::behavior::{ActionArgs, TaskBehavior, TaskRegistry};
use crate::failure::TaskFailure;
use async_trait::async_trait;
use std::sync::Arc;

/// Always succeeds immediately, both forward and reverse.
pub struct NoopTask;

#[async_trait]
impl TaskBehavior for NoopTask {
    async fn run(&self, _args: ActionArgs<'_>) -> Result<String, TaskFailure> {
        Ok("noop".to_string())
    }

    async fn revert(&self, _args: ActionArgs<'_>) -> Result<String, TaskFailure> {
        Ok("noop".to_string())
    }
}

/// Always fails, both forward and reverse. `state.reason` (if present)
/// becomes the failure message.
pub struct FailTask;

#[async_trait]
impl TaskBehavior for FailTask {
    async fn run(&self, args: ActionArgs<'_>) -> Result<String, TaskFailure> {
        Err(reason_failure(&args.state))
    }

    async fn revert(&self, args: ActionArgs<'_>) -> Result<String, TaskFailure> {
        Err(reason_failure(&args.state))
    }
}

fn reason_failure(state: &serde_json::Value) -> TaskFailure {
    let reason = state.get("reason").and_then(|v| v.as_str()).unwrap_or("fail task failed by design");
    TaskFailure::new(reason)
}

/// Ticks once per second up to `state.seconds`, checking `abort`/`term`
/// each tick — the leaf-level analog of [`crate::delay::DelayTask`], used
/// in scenario tests that need a cancellable long-running child without
/// pulling in the full delay semantics (reversibility, minutes+seconds).
pub struct WaitTask;

#[async_trait]
impl TaskBehavior for WaitTask {
    async fn run(&self, args: ActionArgs<'_>) -> Result<String, TaskFailure> {
        let seconds = args.state.get("seconds").and_then(|v| v.as_u64()).unwrap_or(0);
        for _ in 0..seconds {
            if args.abort.is_set() || args.term.is_set() {
                return Ok("wait cancelled".to_string());
            }
            tokio::time::sleep(std::time::Duration::from_secs(1)).await;
        }
        Ok("wait completed".to_string())
    }

    async fn revert(&self, _args: ActionArgs<'_>) -> Result<String, TaskFailure> {
        Ok("wait completed".to_string())
    }
}

/// Succeeds on `run`; on `revert`, latches `abort` before returning — used
/// to deterministically test that a composite executor's revert loop stops
/// dispatching its next child once abort is observed.
pub struct AbortOnRevertTask;

#[async_trait]
impl TaskBehavior for AbortOnRevertTask {
    async fn run(&self, _args: ActionArgs<'_>) -> Result<String, TaskFailure> {
        Ok("noop".to_string())
    }

    async fn revert(&self, args: ActionArgs<'_>) -> Result<String, TaskFailure> {
        args.abort.set();
        Ok("reverted and latched abort".to_string())
    }
}

pub fn register_leaf_behaviors(registry: &mut TaskRegistry) {
    registry.register("noop", Arc::new(NoopTask));
    registry.register("fail", Arc::new(FailTask));
    registry.register("wait", Arc::new(WaitTask));
    registry.register("abort_on_revert", Arc::new(AbortOnRevertTask));
}
