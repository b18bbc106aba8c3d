// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Rollout Contributors

//! Error vocabulary for the orchestrator: precondition violations surface
//! as-is, everything below the orchestration boundary is folded in so
//! `RolloutEngine` methods stay `?`-friendly.

use ro_core::PreconditionError;
use ro_engine::ActionError;
use ro_storage::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Action(#[from] ActionError),
}
