// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Rollout Contributors

//! Identifiers for rollouts and tasks.

crate::define_id! {
    /// Unique identifier for a single deployment attempt.
    pub struct RolloutId("rol-");
}

crate::define_id! {
    /// Unique identifier for a node in a rollout's task tree.
    pub struct TaskId("tsk-");
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
