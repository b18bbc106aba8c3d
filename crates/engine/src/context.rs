// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Rollout Contributors

//! Shared handles every action/executor call threads through.

use crate::behavior::TaskRegistry;
use ro_core::Clock;
use ro_storage::Store;
use std::path::PathBuf;
use std::sync::Arc;

/// Bundles the store, behavior registry, and clock so `run_task`/
/// `revert_task` and the composite executors don't need their own copies of
/// each. Cheap to clone — everything inside is already `Arc`'d.
#[derive(Clone)]
pub struct EngineContext {
    pub store: Arc<dyn Store>,
    pub registry: Arc<TaskRegistry>,
    pub clock: Arc<dyn Clock>,
    /// Directory per-task action logs are written under, as
    /// `{log_dir}/{rollout_id}.{task_id}.{action}`. `None` skips opening a
    /// per-task log scope (most tests don't need one).
    pub log_dir: Option<PathBuf>,
}

impl EngineContext {
    pub fn new(store: Arc<dyn Store>, registry: Arc<TaskRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { store, registry, clock, log_dir: None }
    }

    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(log_dir.into());
        self
    }
}
