// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Rollout Contributors

//! Composite task behaviors: `SequentialExec` runs children one at a time,
//! `ParallelExec` fans them all out at once. Both wait under the harness
//! and turn a child's captured failure into their own.

use crate::action::{revert_task, run_task};
use crate::behavior::{ActionArgs, TaskBehavior};
use crate::context::EngineContext;
use crate::error::ActionError;
use crate::failure::TaskFailure;
use crate::harness::ThreadHarness;
use async_trait::async_trait;
use ro_core::{SignalHandle, TaskId};

fn to_failure(err: ActionError) -> TaskFailure {
    match err {
        ActionError::Task(failure) => failure,
        other => TaskFailure::new(other.to_string()),
    }
}

fn task_order_from_state(state: &serde_json::Value) -> Vec<TaskId> {
    state
        .get("task_order")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str()).map(TaskId::from_string).collect())
        .unwrap_or_default()
}

async fn has_run(engine: &EngineContext, id: &TaskId) -> bool {
    engine.store.get_task(id).map(|t| t.run.has_started()).unwrap_or(false)
}

fn spawn_run(engine: EngineContext, child: TaskId, abort: SignalHandle, term: SignalHandle) -> ThreadHarness {
    ThreadHarness::spawn(async move { run_task(&engine, &child, abort, term).await.map(|_| ()).map_err(to_failure) })
}

fn spawn_revert(engine: EngineContext, child: TaskId, abort: SignalHandle, term: SignalHandle) -> ThreadHarness {
    ThreadHarness::spawn(
        async move { revert_task(&engine, &child, abort, term).await.map(|_| ()).map_err(to_failure) },
    )
}

/// Runs its children one at a time in `state.task_order`, waiting for each
/// before starting the next.
pub struct SequentialExec;

#[async_trait]
impl TaskBehavior for SequentialExec {
    async fn run(&self, args: ActionArgs<'_>) -> Result<String, TaskFailure> {
        let order = task_order_from_state(&args.state);
        let total = order.len();
        let mut ran = 0usize;
        for child in order {
            if args.abort.is_set() || args.term.is_set() {
                break;
            }
            let harness = spawn_run(args.engine.clone(), child, args.abort.clone(), args.term.clone());
            if let Some(failure) = harness.wait(&args.abort).await {
                return Err(failure);
            }
            ran += 1;
        }
        debug_assert!(ran == total || args.abort.is_set() || args.term.is_set());
        Ok(format!("ran {ran} children in order"))
    }

    async fn revert(&self, args: ActionArgs<'_>) -> Result<String, TaskFailure> {
        let order = task_order_from_state(&args.state);
        let mut started = Vec::new();
        for child in order {
            if has_run(args.engine, &child).await {
                started.push(child);
            }
        }
        // abort_rollback suppresses dispatch of the next child, same as term_rollback.
        let mut reverted = 0usize;
        for child in started.into_iter().rev() {
            if args.abort.is_set() || args.term.is_set() {
                break;
            }
            let harness = spawn_revert(args.engine.clone(), child, args.abort.clone(), args.term.clone());
            if let Some(failure) = harness.wait(&args.abort).await {
                return Err(failure);
            }
            reverted += 1;
        }
        Ok(format!("reverted {reverted} children in reverse order"))
    }
}

/// Fans out every child as a worker, then waits for all of them. Stops
/// launching further children once `abort`/`term` is observed but always
/// waits for everything already launched.
pub struct ParallelExec;

#[async_trait]
impl TaskBehavior for ParallelExec {
    async fn run(&self, args: ActionArgs<'_>) -> Result<String, TaskFailure> {
        let mut harnesses = Vec::new();
        for child in &args.children {
            if args.abort.is_set() || args.term.is_set() {
                break;
            }
            harnesses
                .push(spawn_run(args.engine.clone(), child.clone(), args.abort.clone(), args.term.clone()));
        }

        let mut first_failure = None;
        for harness in harnesses {
            if let Some(failure) = harness.wait(&args.abort).await {
                first_failure.get_or_insert(failure);
            }
        }
        match first_failure {
            Some(failure) => Err(failure),
            None => Ok(format!("ran {} children in parallel", args.children.len())),
        }
    }

    async fn revert(&self, args: ActionArgs<'_>) -> Result<String, TaskFailure> {
        let mut started = Vec::new();
        for child in &args.children {
            if has_run(args.engine, child).await {
                started.push(child.clone());
            }
        }

        let mut harnesses = Vec::new();
        for child in started {
            if args.abort.is_set() || args.term.is_set() {
                break;
            }
            harnesses.push(spawn_revert(args.engine.clone(), child, args.abort.clone(), args.term.clone()));
        }

        let mut first_failure = None;
        for harness in harnesses {
            if let Some(failure) = harness.wait(&args.abort).await {
                first_failure.get_or_insert(failure);
            }
        }
        match first_failure {
            Some(failure) => Err(failure),
            None => Ok("reverted children in parallel".to_string()),
        }
    }
}

#[cfg(test)]
#[path = "composite_tests.rs"]
mod tests;
