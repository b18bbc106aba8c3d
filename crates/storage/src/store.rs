// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Rollout Contributors

//! The persistence adapter trait and its in-memory implementation.

use crate::error::StoreError;
use crate::record::{RolloutRecord, TaskRecord};
use ro_core::{PreconditionError, RolloutId, TaskId};

/// Persistence contract the engine and daemon crates depend on. Kept
/// deliberately small (CRUD plus the two lookups the executors need) so a
/// future on-disk or networked implementation can slot in without touching
/// callers.
pub trait Store: Send + Sync {
    fn create_rollout(&self, config: serde_json::Value) -> RolloutRecord;

    fn get_rollout(&self, id: &RolloutId) -> Result<RolloutRecord, StoreError>;

    fn save_rollout(&self, rollout: RolloutRecord) -> Result<(), StoreError>;

    fn list_rollouts(&self, include_hidden: bool) -> Vec<RolloutRecord>;

    /// Delete every task currently attached to `rollout_id`. Used by
    /// `generate_tasks` to clear a previous attempt before regenerating.
    fn delete_tasks_for_rollout(&self, rollout_id: &RolloutId);

    fn insert_task(&self, task: TaskRecord);

    fn get_task(&self, id: &TaskId) -> Result<TaskRecord, StoreError>;

    fn save_task(&self, task: TaskRecord) -> Result<(), StoreError>;

    fn list_tasks_for_rollout(&self, rollout_id: &RolloutId) -> Vec<TaskRecord>;

    /// The single task in the tree with no parent. Errors if zero or more
    /// than one candidate exists.
    fn root_task(&self, rollout_id: &RolloutId) -> Result<TaskRecord, StoreError> {
        let mut roots: Vec<TaskRecord> =
            self.list_tasks_for_rollout(rollout_id).into_iter().filter(TaskRecord::is_root).collect();
        match roots.len() {
            0 => Err(StoreError::Precondition(PreconditionError::NoRoot { rollout_id: rollout_id.to_string() })),
            1 => Ok(roots.remove(0)),
            _ => Err(StoreError::Precondition(PreconditionError::MultipleRoots {
                rollout_id: rollout_id.to_string(),
            })),
        }
    }
}

mod mem;
pub use mem::MemStore;

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
