// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Rollout Contributors

//! The process-wide signal bus: a map from `(rollout_id, signal_name)` to a
//! [`SignalHandle`], guarded by a single lock for create/destroy. Reads
//! (`is_set`) never take the map lock — they go straight to the handle's
//! atomic, which is the "three-state read atomic on the map + one-way latch"
//! shared-resource guarantee this component exists to provide.

use parking_lot::Mutex;
use ro_core::{RolloutId, SignalHandle, SignalName};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub struct SignalBus {
    handles: Mutex<HashMap<(RolloutId, SignalName), SignalHandle>>,
}

impl SignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh unset signal, overwriting any stale handle left behind
    /// by a prior phase for the same `(rollout_id, name)`.
    pub fn make(&self, rollout_id: &RolloutId, name: SignalName) {
        self.handles.lock().insert((rollout_id.clone(), name), SignalHandle::new());
    }

    /// Create every signal in `names`, in order.
    pub fn make_all(&self, rollout_id: &RolloutId, names: &[SignalName]) {
        for name in names {
            self.make(rollout_id, *name);
        }
    }

    pub fn get(&self, rollout_id: &RolloutId, name: SignalName) -> Option<SignalHandle> {
        self.handles.lock().get(&(rollout_id.clone(), name)).cloned()
    }

    /// Returns `true` iff the signal exists and this call transitioned it
    /// from unset to set. An already-set signal reports `false`, not an
    /// error; a missing signal also reports `false`.
    pub fn set(&self, rollout_id: &RolloutId, name: SignalName) -> bool {
        match self.get(rollout_id, name) {
            Some(handle) => handle.set(),
            None => false,
        }
    }

    pub fn is_set(&self, rollout_id: &RolloutId, name: SignalName) -> bool {
        self.get(rollout_id, name).map(|h| h.is_set()).unwrap_or(false)
    }

    /// `true` iff the signal exists and is not yet set — what the UI uses
    /// to decide whether to show a button for it.
    pub fn can_signal(&self, rollout_id: &RolloutId, name: SignalName) -> bool {
        self.get(rollout_id, name).map(|h| !h.is_set()).unwrap_or(false)
    }

    pub fn destroy(&self, rollout_id: &RolloutId, name: SignalName) {
        self.handles.lock().remove(&(rollout_id.clone(), name));
    }

    pub fn destroy_all(&self, rollout_id: &RolloutId, names: &[SignalName]) {
        let mut handles = self.handles.lock();
        for name in names {
            handles.remove(&(rollout_id.clone(), *name));
        }
    }
}

/// Wraps a `SignalBus` for sharing across the orchestrator and any monitor
/// tasks it spawns.
pub type SharedSignalBus = Arc<SignalBus>;

#[cfg(test)]
#[path = "signal_bus_tests.rs"]
mod tests;
