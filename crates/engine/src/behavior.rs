// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Rollout Contributors

//! Tagged-variant dispatch for task types: a closed trait object registry
//! keyed by the task's `task_type` string, in place of a class hierarchy.

use crate::context::EngineContext;
use crate::failure::TaskFailure;
use async_trait::async_trait;
use indexmap::IndexMap;
use ro_core::{SignalHandle, TaskId};
use std::sync::Arc;

/// The arguments a task type's implementation receives, mirroring the
/// original's `(state, children, abort_signal, term_signal)` contract.
pub struct ActionArgs<'a> {
    pub engine: &'a EngineContext,
    pub task_id: TaskId,
    pub state: serde_json::Value,
    pub children: Vec<TaskId>,
    pub abort: SignalHandle,
    pub term: SignalHandle,
}

/// A task type's forward/reverse implementation.
#[async_trait]
pub trait TaskBehavior: Send + Sync {
    /// Execute forward. Returns a short human-readable result string on
    /// success (persisted to `run_return`).
    async fn run(&self, args: ActionArgs<'_>) -> Result<String, TaskFailure>;

    /// Undo. Returns a short human-readable result string on success
    /// (persisted to `revert_return`).
    async fn revert(&self, args: ActionArgs<'_>) -> Result<String, TaskFailure>;
}

/// Maps a task's `task_type` discriminator to its behavior implementation.
#[derive(Clone, Default)]
pub struct TaskRegistry {
    behaviors: IndexMap<String, Arc<dyn TaskBehavior>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, task_type: impl Into<String>, behavior: Arc<dyn TaskBehavior>) -> &mut Self {
        self.behaviors.insert(task_type.into(), behavior);
        self
    }

    pub fn get(&self, task_type: &str) -> Option<Arc<dyn TaskBehavior>> {
        self.behaviors.get(task_type).cloned()
    }

    /// The standard registry: `sequential`, `parallel`, `delay`, plus — under
    /// `test-support` — the `noop`/`fail`/`wait` leaf behaviors used by the
    /// end-to-end scenario suite.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register("sequential", Arc::new(crate::composite::SequentialExec));
        registry.register("parallel", Arc::new(crate::composite::ParallelExec));
        registry.register("delay", Arc::new(crate::delay::DelayTask));
        #[cfg(any(test, feature = "test-support"))]
        crate::testing::register_leaf_behaviors(&mut registry);
        registry
    }
}

#[cfg(test)]
#[path = "behavior_tests.rs"]
mod tests;
