// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Rollout Contributors

//! The task base state machine: `run`/`revert` as free functions operating
//! against an [`EngineContext`], since tagged dispatch replaces the
//! original's base-class template methods.

use crate::behavior::ActionArgs;
use crate::context::EngineContext;
use crate::error::ActionError;
use ro_core::{task_log_path, ActionLogScope, PreconditionError, SignalHandle, TaskId};
use ro_storage::TaskRecord;
use tracing::instrument;
use tracing_futures::WithSubscriber;

/// Run a task forward.
///
/// Fails if `run` already started. On return, persists the stringified
/// result; on failure, persists the error and traceback and rethrows —
/// persistence happens on every exit path before the error reaches the
/// caller.
#[instrument(skip(ctx, abort, term), fields(task_id = %task_id))]
pub async fn run_task(
    ctx: &EngineContext,
    task_id: &TaskId,
    abort: SignalHandle,
    term: SignalHandle,
) -> Result<String, ActionError> {
    let mut task = ctx.store.get_task(task_id)?;
    if task.run.has_started() {
        return Err(PreconditionError::ActionAlreadyStarted {
            action: "run",
            started_at_ms: task.run.start_ms.unwrap_or_default(),
        }
        .into());
    }

    let started_at = ctx.clock.now_ms();
    task.run.start_ms = Some(started_at);
    ctx.store.save_task(task.clone())?;

    execute(ctx, task_id, &mut task, abort, term, false).await
}

/// Revert a task.
///
/// Identical shape to `run`, but fails if `run` never started (you can't
/// undo what never happened) rather than if it already did.
#[instrument(skip(ctx, abort, term), fields(task_id = %task_id))]
pub async fn revert_task(
    ctx: &EngineContext,
    task_id: &TaskId,
    abort: SignalHandle,
    term: SignalHandle,
) -> Result<String, ActionError> {
    let mut task = ctx.store.get_task(task_id)?;
    if !task.run.has_started() {
        return Err(PreconditionError::RevertBeforeRun.into());
    }
    if task.revert.has_started() {
        return Err(PreconditionError::ActionAlreadyStarted {
            action: "revert",
            started_at_ms: task.revert.start_ms.unwrap_or_default(),
        }
        .into());
    }

    let started_at = ctx.clock.now_ms();
    task.revert.start_ms = Some(started_at);
    ctx.store.save_task(task.clone())?;

    execute(ctx, task_id, &mut task, abort, term, true).await
}

async fn execute(
    ctx: &EngineContext,
    task_id: &TaskId,
    task: &mut TaskRecord,
    abort: SignalHandle,
    term: SignalHandle,
    reverting: bool,
) -> Result<String, ActionError> {
    let behavior = ctx
        .registry
        .get(&task.task_type)
        .ok_or_else(|| ActionError::UnknownTaskType(task.task_type.clone()))?;

    let args = ActionArgs {
        engine: ctx,
        task_id: task_id.clone(),
        state: task.state.clone(),
        children: task.children.clone(),
        abort,
        term,
    };

    let action_name = if reverting { "revert" } else { "run" };
    let scope = ctx
        .log_dir
        .as_ref()
        .map(|log_dir| task_log_path(log_dir, &task.rollout_id, task_id, action_name))
        .and_then(|path| ActionLogScope::open(&path).ok());

    let action = async move { if reverting { behavior.revert(args).await } else { behavior.run(args).await } };
    let outcome = match &scope {
        Some(scope) => action.with_subscriber(scope.dispatch()).await,
        None => action.await,
    };
    let finished_at = ctx.clock.now_ms();

    // Reload before writing back: a long-running child may have had its
    // sibling fields touched by a concurrent save elsewhere in the tree.
    // A failure anywhere in this block is best-effort persistence only —
    // the in-memory `outcome` the executor already computed is returned
    // either way, never overridden by a store error.
    if let Ok(mut fresh) = ctx.store.get_task(task_id) {
        let action = if reverting { &mut fresh.revert } else { &mut fresh.run };
        match &outcome {
            Ok(value) => action.record_return(value.clone(), finished_at),
            Err(failure) => action.record_error(failure.message.clone(), failure.traceback.clone(), finished_at),
        }
        if let Err(err) = ctx.store.save_task(fresh) {
            tracing::warn!(%task_id, error = %err, "failed to persist action outcome; in-memory result still authoritative");
        }
    } else {
        tracing::warn!(%task_id, "failed to reload task before persisting action outcome; in-memory result still authoritative");
    }

    outcome.map_err(ActionError::from)
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
