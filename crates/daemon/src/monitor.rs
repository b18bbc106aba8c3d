// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Rollout Contributors

//! Monitors: user-provided background callables that run for the duration
//! of a rollout's forward pass and may call `abort.set()` to trigger
//! rollback. The registry is a name → callable map the same shape as
//! [`ro_engine::TaskRegistry`], looked up against `config.monitors` at
//! `rollout` time.

use ro_core::SignalHandle;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A monitor body. Receives the `monitoring` liveness latch — unlike every
/// cancellation signal, this one is cleared (not just destroyed) once the
/// rollout's forward pass finishes, so a monitor written as `while
/// monitoring.is_set() { ... }` observes the clear on its next poll and
/// actually exits instead of polling a permanently-latched flag forever —
/// and the `abort_rollout` signal it may set.
pub trait Monitor: Send + Sync {
    fn watch(&self, monitoring: SignalHandle, abort: SignalHandle) -> BoxFuture;
}

impl<F, Fut> Monitor for F
where
    F: Fn(SignalHandle, SignalHandle) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn watch(&self, monitoring: SignalHandle, abort: SignalHandle) -> BoxFuture {
        Box::pin((self)(monitoring, abort))
    }
}

/// Class-level registry of monitor names to implementations, mirroring the
/// original's `Rollout.monitors` dict.
#[derive(Clone, Default)]
pub struct MonitorRegistry {
    monitors: indexmap::IndexMap<String, Arc<dyn Monitor>>,
}

impl MonitorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, monitor: Arc<dyn Monitor>) -> &mut Self {
        self.monitors.insert(name.into(), monitor);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Monitor>> {
        self.monitors.get(name).cloned()
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
