// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Rollout Contributors

//! Precondition-violation vocabulary shared by the storage, engine, and
//! daemon crates. These are raised with a descriptive message and are never
//! caught and retried by the engine.

use thiserror::Error;

/// A precondition violation: the caller asked for something the state
/// machine forbids. These are programmer/operator errors, never caught and
/// retried by the engine itself.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("{action} already started at {started_at_ms}")]
    ActionAlreadyStarted { action: &'static str, started_at_ms: u64 },

    #[error("cannot revert before running")]
    RevertBeforeRun,

    #[error("rollout already started at {started_at_ms}")]
    RolloutAlreadyStarted { started_at_ms: u64 },

    #[error("cannot generate tasks after rollout has started")]
    GenerateAfterStart,

    #[error("no root task found for rollout {rollout_id}")]
    NoRoot { rollout_id: String },

    #[error("more than one task has no parent for rollout {rollout_id}")]
    MultipleRoots { rollout_id: String },

    #[error("rollout {rollout_id} was finalised more than the freshness window ago; refinalise before rolling out")]
    Stale { rollout_id: String },
}
