// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Rollout Contributors

//! Durable record types: one `RolloutRecord` per deployment attempt, one
//! `TaskRecord` per node in its task tree, each task carrying a `run` and a
//! `revert` `ActionRecord`.

use ro_core::{RolloutId, TaskId};
use serde::{Deserialize, Serialize};

/// Error and traceback strings are capped at these lengths and silently
/// truncated on overflow rather than rejected.
pub const ERROR_CAP_BYTES: usize = 500;
pub const TRACEBACK_CAP_BYTES: usize = 1000;

/// Truncate `s` to at most `cap` bytes on a char boundary.
pub fn truncate_to(s: &str, cap: usize) -> String {
    if s.len() <= cap {
        return s.to_string();
    }
    let mut end = cap;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

/// The record of a single `run` or `revert` action on a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionRecord {
    pub start_ms: Option<u64>,
    pub return_value: Option<String>,
    pub return_ms: Option<u64>,
    pub error: Option<String>,
    pub error_ms: Option<u64>,
    pub traceback: Option<String>,
}

impl ActionRecord {
    pub fn has_started(&self) -> bool {
        self.start_ms.is_some()
    }

    pub fn has_finished(&self) -> bool {
        self.return_ms.is_some() || self.error_ms.is_some()
    }

    /// Record a successful return, truncating the value to the error cap
    /// (return and error share the same column width).
    pub fn record_return(&mut self, value: impl Into<String>, at_ms: u64) {
        self.return_value = Some(truncate_to(&value.into(), ERROR_CAP_BYTES));
        self.return_ms = Some(at_ms);
    }

    pub fn record_error(&mut self, error: impl Into<String>, traceback: impl Into<String>, at_ms: u64) {
        self.error = Some(truncate_to(&error.into(), ERROR_CAP_BYTES));
        self.traceback = Some(truncate_to(&traceback.into(), TRACEBACK_CAP_BYTES));
        self.error_ms = Some(at_ms);
    }
}

/// One node in a rollout's task tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub rollout_id: RolloutId,
    pub task_type: String,
    pub parent_id: Option<TaskId>,
    pub children: Vec<TaskId>,
    pub state: serde_json::Value,
    pub run: ActionRecord,
    pub revert: ActionRecord,
}

impl TaskRecord {
    pub fn new_root(rollout_id: RolloutId, task_type: impl Into<String>, state: serde_json::Value) -> Self {
        Self {
            id: TaskId::new(),
            rollout_id,
            task_type: task_type.into(),
            parent_id: None,
            children: Vec::new(),
            state,
            run: ActionRecord::default(),
            revert: ActionRecord::default(),
        }
    }

    pub fn new_child(
        rollout_id: RolloutId,
        parent_id: TaskId,
        task_type: impl Into<String>,
        state: serde_json::Value,
    ) -> Self {
        Self {
            id: TaskId::new(),
            rollout_id,
            task_type: task_type.into(),
            parent_id: Some(parent_id),
            children: Vec::new(),
            state,
            run: ActionRecord::default(),
            revert: ActionRecord::default(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// One durable record per deployment attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolloutRecord {
    pub id: RolloutId,
    pub config: serde_json::Value,
    pub hidden: bool,
    pub generate_tasks_ms: Option<u64>,
    pub rollout_start_ms: Option<u64>,
    pub rollout_finish_ms: Option<u64>,
    pub rollback_start_ms: Option<u64>,
    pub rollback_finish_ms: Option<u64>,
}

impl RolloutRecord {
    pub fn new(id: RolloutId, config: serde_json::Value) -> Self {
        Self {
            id,
            config,
            hidden: false,
            generate_tasks_ms: None,
            rollout_start_ms: None,
            rollout_finish_ms: None,
            rollback_start_ms: None,
            rollback_finish_ms: None,
        }
    }

    pub fn has_started(&self) -> bool {
        self.rollout_start_ms.is_some()
    }

    /// The `monitors` field the orchestrator reads off the opaque config,
    /// defaulting to an empty list when absent or malformed.
    pub fn monitor_names(&self) -> Vec<String> {
        self.config
            .get("monitors")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(String::from)).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
