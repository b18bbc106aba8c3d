// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Rollout Contributors

//! Per-rollout and per-task log file layout: `{LOG_DIR}/{rollout_id}.{action}`
//! for rollout-level actions, `{LOG_DIR}/{rollout_id}.{task_id}.{action}` for
//! task actions. Shared between `ro-engine` (which opens the per-task scope
//! from inside the run/revert action engine) and `ro-daemon` (which opens
//! the per-rollout scope around the orchestrator's forward/rollback passes).

use crate::{RolloutId, TaskId};
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;

pub fn rollout_log_path(log_dir: &Path, rollout_id: &RolloutId, action: &str) -> PathBuf {
    log_dir.join(format!("{rollout_id}.{action}"))
}

pub fn task_log_path(log_dir: &Path, rollout_id: &RolloutId, task_id: &TaskId, action: &str) -> PathBuf {
    log_dir.join(format!("{rollout_id}.{task_id}.{action}"))
}

/// A dedicated `tracing` subscriber for the duration of one action
/// (`rollout`, `rollback`, or a single task's `run`/`revert`): a `fmt` layer
/// writing to its own `tracing-appender` non-blocking file. Install
/// [`dispatch`](ActionLogScope::dispatch) over the action's future with
/// `tracing_futures::WithSubscriber::with_subscriber` so every span/event it
/// emits — on whichever worker thread ends up polling it — lands in this
/// scope's file instead of the process-wide subscriber. Held for the scope
/// of the action; dropping it flushes and closes the underlying writer.
pub struct ActionLogScope {
    dispatch: tracing::Dispatch,
    _guard: WorkerGuard,
}

impl ActionLogScope {
    /// Open (creating parent directories as needed) the log file at `path`.
    pub fn open(path: &Path) -> io::Result<Self> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;
        let file_name = path
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "log path has no file name"))?;
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let subscriber = tracing_subscriber::fmt().with_writer(writer).with_ansi(false).finish();
        Ok(Self { dispatch: tracing::Dispatch::new(subscriber), _guard: guard })
    }

    /// The dispatcher to install over the action's future for this scope's
    /// lifetime. Cheap to clone (an `Arc` underneath).
    pub fn dispatch(&self) -> tracing::Dispatch {
        self.dispatch.clone()
    }
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
