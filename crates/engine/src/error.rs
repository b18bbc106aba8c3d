// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Rollout Contributors

//! Engine-level error vocabulary: preconditions, store failures, and
//! rethrown task failures all fold into one type so callers have a single
//! `?`-friendly surface.

use crate::failure::TaskFailure;
use ro_core::PreconditionError;
use ro_storage::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("unknown task type: {0}")]
    UnknownTaskType(String),

    #[error(transparent)]
    Task(#[from] TaskFailure),
}
