// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Rollout Contributors

//! The captured-exception vocabulary tasks and workers propagate.

use std::fmt;

/// A task action's failure, captured rather than unwound across the worker
/// boundary. Carries both a short message (persisted to `{action}_error`)
/// and a longer trace (persisted to `{action}_traceback`) the way the
/// original's `traceback.format_exc()` populated both columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub message: String,
    pub traceback: String,
}

impl TaskFailure {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self { traceback: message.clone(), message }
    }

    pub fn with_traceback(message: impl Into<String>, traceback: impl Into<String>) -> Self {
        Self { message: message.into(), traceback: traceback.into() }
    }

    /// Build a failure from a worker task that panicked or was cancelled.
    pub fn from_join_error(err: &tokio::task::JoinError) -> Self {
        if err.is_panic() {
            Self::with_traceback("worker task panicked", format!("{err:?}"))
        } else {
            Self::with_traceback("worker task was cancelled", format!("{err:?}"))
        }
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TaskFailure {}
