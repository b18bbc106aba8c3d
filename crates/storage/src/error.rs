// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Rollout Contributors

//! Storage-layer error vocabulary.

use ro_core::{PreconditionError, RolloutId, TaskId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("rollout {0} not found")]
    RolloutNotFound(RolloutId),

    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    #[error(transparent)]
    Precondition(#[from] PreconditionError),
}
