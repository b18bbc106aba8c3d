// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Rollout Contributors

//! A leaf task that waits out a fixed duration, cancellable one tick at a
//! time rather than all at once — this is what keeps a delay's
//! cancellation latency bounded instead of proportional to its length.

use crate::behavior::{ActionArgs, TaskBehavior};
use crate::failure::TaskFailure;
use async_trait::async_trait;
use std::time::Duration;

pub struct DelayTask;

fn total_seconds(state: &serde_json::Value) -> u64 {
    let minutes = state.get("minutes").and_then(|v| v.as_u64()).unwrap_or(0);
    let seconds = state.get("seconds").and_then(|v| v.as_u64()).unwrap_or(0);
    minutes * 60 + seconds
}

fn reversible(state: &serde_json::Value) -> bool {
    state.get("reversible").and_then(|v| v.as_bool()).unwrap_or(false)
}

/// Sleep up to `total` seconds in 1-second increments, returning early (but
/// not as an error) the moment either signal latches.
async fn tick_wait(total: u64, args: &ActionArgs<'_>) {
    for _ in 0..total {
        if args.abort.is_set() || args.term.is_set() {
            return;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

/// `M:SS mins` when at least a minute remains, else `N secs`. Used for CLI
/// display only.
pub fn min_sec_str(total_secs: u64) -> String {
    let mins = total_secs / 60;
    let secs = total_secs % 60;
    if mins > 0 {
        format!("{mins}:{secs:02} mins")
    } else {
        format!("{secs} secs")
    }
}

/// A one-line human description of a delay task's configured duration, for
/// CLI display — no effect on execution.
pub fn friendly_str(state: &serde_json::Value) -> String {
    let total = total_seconds(state);
    let rev_str = if reversible(state) { " (reversible)" } else { "" };
    format!("Delay for {}{rev_str}", min_sec_str(total))
}

#[async_trait]
impl TaskBehavior for DelayTask {
    async fn run(&self, args: ActionArgs<'_>) -> Result<String, TaskFailure> {
        let total = total_seconds(&args.state);
        tick_wait(total, &args).await;
        Ok(format!("delayed up to {total}s"))
    }

    async fn revert(&self, args: ActionArgs<'_>) -> Result<String, TaskFailure> {
        if !reversible(&args.state) {
            return Ok("delay is not reversible".to_string());
        }
        let total = total_seconds(&args.state);
        tick_wait(total, &args).await;
        Ok(format!("reverted delay of up to {total}s"))
    }
}

#[cfg(test)]
#[path = "delay_tests.rs"]
mod tests;
