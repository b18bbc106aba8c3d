// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Rollout Contributors

//! In-process `Store` implementation backed by `parking_lot` maps.

use super::Store;
use crate::error::StoreError;
use crate::record::{RolloutRecord, TaskRecord};
use indexmap::IndexMap;
use parking_lot::RwLock;
use ro_core::{RolloutId, TaskId};

/// An in-memory `Store`. Data does not survive process restart; this is the
/// implementation the CLI and test suite use, standing in for a database
/// while leaving room for one behind the same trait.
#[derive(Default)]
pub struct MemStore {
    rollouts: RwLock<IndexMap<RolloutId, RolloutRecord>>,
    tasks: RwLock<IndexMap<TaskId, TaskRecord>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemStore {
    fn create_rollout(&self, config: serde_json::Value) -> RolloutRecord {
        let record = RolloutRecord::new(RolloutId::new(), config);
        self.rollouts.write().insert(record.id.clone(), record.clone());
        record
    }

    fn get_rollout(&self, id: &RolloutId) -> Result<RolloutRecord, StoreError> {
        self.rollouts.read().get(id).cloned().ok_or_else(|| StoreError::RolloutNotFound(id.clone()))
    }

    fn save_rollout(&self, rollout: RolloutRecord) -> Result<(), StoreError> {
        let mut rollouts = self.rollouts.write();
        if !rollouts.contains_key(&rollout.id) {
            return Err(StoreError::RolloutNotFound(rollout.id));
        }
        rollouts.insert(rollout.id.clone(), rollout);
        Ok(())
    }

    fn list_rollouts(&self, include_hidden: bool) -> Vec<RolloutRecord> {
        self.rollouts.read().values().filter(|r| include_hidden || !r.hidden).cloned().collect()
    }

    fn delete_tasks_for_rollout(&self, rollout_id: &RolloutId) {
        self.tasks.write().retain(|_, task| &task.rollout_id != rollout_id);
    }

    fn insert_task(&self, task: TaskRecord) {
        self.tasks.write().insert(task.id.clone(), task);
    }

    fn get_task(&self, id: &TaskId) -> Result<TaskRecord, StoreError> {
        self.tasks.read().get(id).cloned().ok_or_else(|| StoreError::TaskNotFound(id.clone()))
    }

    fn save_task(&self, task: TaskRecord) -> Result<(), StoreError> {
        let mut tasks = self.tasks.write();
        if !tasks.contains_key(&task.id) {
            return Err(StoreError::TaskNotFound(task.id));
        }
        tasks.insert(task.id.clone(), task);
        Ok(())
    }

    fn list_tasks_for_rollout(&self, rollout_id: &RolloutId) -> Vec<TaskRecord> {
        self.tasks.read().values().filter(|t| &t.rollout_id == rollout_id).cloned().collect()
    }
}
