// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Rollout Contributors

//! A representative task tree for exercising the control surface: a
//! sequential pre-flight delay, a parallel fan-out of two service delays,
//! then a sequential soak delay. No leaf ever fails on its own — the only
//! production task types are `sequential`/`parallel`/`delay` — so the
//! interesting paths (abort/term short-circuit, skip_rollback) are driven by
//! the `signal` subcommand rather than by an injected failure.

use ro_core::{RolloutId, TaskId};
use ro_storage::{Store, TaskRecord};
use std::sync::Arc;

fn delay(store: &Arc<dyn Store>, rollout_id: &RolloutId, parent: &TaskId, seconds: u64) -> TaskId {
    let task = TaskRecord::new_child(
        rollout_id.clone(),
        parent.clone(),
        "delay",
        serde_json::json!({ "seconds": seconds, "reversible": true }),
    );
    let id = task.id.clone();
    store.insert_task(task);
    id
}

fn order_state(order: &[TaskId]) -> serde_json::Value {
    serde_json::json!({ "task_order": order.iter().map(TaskId::as_str).collect::<Vec<_>>() })
}

/// Builds the root and every descendant, returning the root's id.
///
/// Child ids are reserved up front (`TaskId::new`) so each composite's
/// `task_order`/`children` can be set at construction time rather than via a
/// read-modify-write round trip through the store.
///
/// `leaf_seconds` sizes each delay leaf — short for a quick synchronous
/// demo, longer when the caller wants a window to send a signal in.
pub fn build(store: &Arc<dyn Store>, rollout_id: &RolloutId, leaf_seconds: u64) -> TaskId {
    let root_id = TaskId::new();
    let parallel_id = TaskId::new();

    let preflight = delay(store, rollout_id, &root_id, leaf_seconds);
    let service_a = delay(store, rollout_id, &parallel_id, leaf_seconds);
    let service_b = delay(store, rollout_id, &parallel_id, leaf_seconds);
    let soak = delay(store, rollout_id, &root_id, leaf_seconds);

    let mut parallel =
        TaskRecord::new_child(rollout_id.clone(), root_id.clone(), "parallel", serde_json::json!({}));
    parallel.id = parallel_id.clone();
    parallel.children = vec![service_a, service_b];
    store.insert_task(parallel);

    let mut root = TaskRecord::new_root(rollout_id.clone(), "sequential", serde_json::json!({}));
    root.id = root_id.clone();
    root.children = vec![preflight.clone(), parallel_id.clone(), soak.clone()];
    root.state = order_state(&root.children);
    store.insert_task(root);

    root_id
}
