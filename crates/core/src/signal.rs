// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Rollout Contributors

//! The closed set of signal names recognised by the signal bus.

use serde::{Deserialize, Serialize};

/// One of the six named cancellation/control latches a rollout can carry.
///
/// `abort_*` asks the tree to stop **and** roll back; `term_*` asks it to
/// stop without any further work (including, during rollback, without
/// finishing the rollback itself). `skip_rollback` suppresses rollback
/// entirely on rollout failure. `monitoring` is the liveness latch handed to
/// monitor callables, not a cancellation signal itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalName {
    AbortRollout,
    TermRollout,
    Monitoring,
    SkipRollback,
    AbortRollback,
    TermRollback,
}

impl SignalName {
    /// All signals created at the start of the rollout phase.
    pub const ROLLOUT_PHASE: [SignalName; 4] =
        [SignalName::AbortRollout, SignalName::TermRollout, SignalName::Monitoring, SignalName::SkipRollback];

    /// All signals created at the start of the rollback phase.
    pub const ROLLBACK_PHASE: [SignalName; 2] = [SignalName::AbortRollback, SignalName::TermRollback];

    /// Parse a signal name from its wire/CLI string form.
    ///
    /// Returns `None` for any name outside the closed set.
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "abort_rollout" => SignalName::AbortRollout,
            "term_rollout" => SignalName::TermRollout,
            "monitoring" => SignalName::Monitoring,
            "skip_rollback" => SignalName::SkipRollback,
            "abort_rollback" => SignalName::AbortRollback,
            "term_rollback" => SignalName::TermRollback,
            _ => return None,
        })
    }

    /// The user-facing description of what setting this signal does.
    pub fn description(&self) -> &'static str {
        match self {
            SignalName::AbortRollout => "stop and roll back",
            SignalName::TermRollout => "stop forward progress, no further rollback beyond what's done",
            SignalName::Monitoring => "monitors are active",
            SignalName::SkipRollback => "on failure do not roll back",
            SignalName::AbortRollback => "stop rollback",
            SignalName::TermRollback => "hard halt rollback",
        }
    }
}

crate::simple_display! {
    SignalName {
        AbortRollout => "abort_rollout",
        TermRollout => "term_rollout",
        Monitoring => "monitoring",
        SkipRollback => "skip_rollback",
        AbortRollback => "abort_rollback",
        TermRollback => "term_rollback",
    }
}

/// A single one-way latch: unset → set, never the other direction — with one
/// documented exception, [`clear`](SignalHandle::clear), used only by the
/// `monitoring` liveness latch (every cancellation signal — `abort_*`/
/// `term_*`/`skip_rollback` — stays monotonic for its whole life and must
/// never call it).
///
/// Cheaply cloneable (an `Arc<AtomicBool>` underneath) so the owning bus can
/// hand out copies to every task and worker that needs to read it without
/// contending on a shared map lock. Because clones share the same atomic,
/// clearing any one of them is immediately visible to every monitor holding
/// a clone, not just the one the rollout orchestrator kept for itself.
#[derive(Debug, Clone)]
pub struct SignalHandle {
    flag: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

impl SignalHandle {
    pub fn new() -> Self {
        Self { flag: std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false)) }
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Latch the signal. Returns `true` iff this call transitioned it from
    /// unset to set (idempotent-safe: setting an already-set signal reports
    /// `false`, not an error).
    pub fn set(&self) -> bool {
        !self.flag.swap(true, std::sync::atomic::Ordering::SeqCst)
    }

    /// Reset the latch to unset. Reserved for `monitoring`: the rollout
    /// orchestrator clears it once the forward pass finishes so any monitor
    /// still polling `is_set()` notices on its next poll and stops, the way
    /// `threading.Event.clear()` does for the original's monitor loop.
    pub fn clear(&self) {
        self.flag.store(false, std::sync::atomic::Ordering::SeqCst);
    }
}

impl Default for SignalHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;
