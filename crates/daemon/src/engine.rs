// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Rollout Contributors

//! `RolloutEngine`: the top-level orchestrator. Owns the lifecycle
//! timestamps on the `Rollout` record, the signal setup/teardown for each
//! phase, monitor spawning, and the rollback driver.

use crate::config::Config;
use crate::error::EngineError;
use crate::monitor::MonitorRegistry;
use crate::signal_bus::SharedSignalBus;
use ro_core::{rollout_log_path, ActionLogScope, Clock, PreconditionError, RolloutId, SignalName};
use ro_engine::{run_task, ActionError, EngineContext, TaskFailure, TaskRegistry, ThreadHarness};
use ro_storage::{RolloutRecord, Store};
use std::sync::Arc;
use tracing::instrument;
use tracing_futures::WithSubscriber;

/// The nine states `status()` derives from lifecycle timestamps and current
/// signal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutStatus {
    NotStarted,
    Started,
    TerminatingRollout,
    AbortingRollout,
    Finished,
    RollingBack,
    TerminatingRollback,
    AbortingRollback,
    RolledBack,
}

ro_core::simple_display! {
    RolloutStatus {
        NotStarted => "not_started",
        Started => "started",
        TerminatingRollout => "terminating_rollout",
        AbortingRollout => "aborting_rollout",
        Finished => "finished",
        RollingBack => "rolling_back",
        TerminatingRollback => "terminating_rollback",
        AbortingRollback => "aborting_rollback",
        RolledBack => "rolled_back",
    }
}

/// The result of a `signal()` call — whether it actually latched anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    Succeeded,
    Failed,
}

fn action_error_to_failure(err: ActionError) -> TaskFailure {
    match err {
        ActionError::Task(failure) => failure,
        other => TaskFailure::new(other.to_string()),
    }
}

/// The orchestrator. Cheaply cloneable — every field is already `Arc`'d or
/// small enough to copy — so a single instance can back a CLI, a test
/// harness, or (eventually) a server without extra wrapping.
#[derive(Clone)]
pub struct RolloutEngine {
    store: Arc<dyn Store>,
    registry: Arc<TaskRegistry>,
    clock: Arc<dyn Clock>,
    signals: SharedSignalBus,
    monitors: Arc<MonitorRegistry>,
    config: Config,
}

impl RolloutEngine {
    pub fn new(
        store: Arc<dyn Store>,
        registry: Arc<TaskRegistry>,
        clock: Arc<dyn Clock>,
        signals: SharedSignalBus,
        monitors: Arc<MonitorRegistry>,
        config: Config,
    ) -> Self {
        Self { store, registry, clock, signals, monitors, config }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    fn engine_context(&self) -> EngineContext {
        EngineContext::new(self.store.clone(), self.registry.clone(), self.clock.clone())
            .with_log_dir(self.config.log_dir.clone())
    }

    /// Idempotent; clears any previously generated tree for this rollout.
    /// Fails if the rollout has already started.
    pub fn generate_tasks(
        &self,
        rollout_id: &RolloutId,
        generator: impl FnOnce(&Arc<dyn Store>, &RolloutId),
    ) -> Result<(), EngineError> {
        let rollout = self.store.get_rollout(rollout_id)?;
        if rollout.has_started() {
            return Err(PreconditionError::GenerateAfterStart.into());
        }

        self.store.delete_tasks_for_rollout(rollout_id);
        generator(&self.store, rollout_id);

        let mut rollout = self.store.get_rollout(rollout_id)?;
        rollout.generate_tasks_ms = Some(self.clock.now_ms());
        self.store.save_rollout(rollout)?;
        Ok(())
    }

    /// The freshness gate `rollout_async` enforces: refuse to start if more
    /// than `config.freshness_window` has elapsed since `generate_tasks_dt`.
    fn check_freshness(&self, rollout: &RolloutRecord) -> Result<(), EngineError> {
        let Some(generated_at) = rollout.generate_tasks_ms else {
            return Ok(());
        };
        let elapsed_ms = self.clock.now_ms().saturating_sub(generated_at);
        if elapsed_ms > self.config.freshness_window().as_millis() as u64 {
            return Err(PreconditionError::Stale { rollout_id: rollout.id.to_string() }.into());
        }
        Ok(())
    }

    /// Detach from the caller and run `rollout` on a background task,
    /// returning immediately. Refuses to start (without spawning anything)
    /// if the generated tree has gone stale per the freshness window.
    pub fn rollout_async(
        &self,
        rollout_id: &RolloutId,
    ) -> Result<tokio::task::JoinHandle<Result<(), EngineError>>, EngineError> {
        let rollout = self.store.get_rollout(rollout_id)?;
        self.check_freshness(&rollout)?;

        let engine = self.clone();
        let rollout_id = rollout_id.clone();
        Ok(tokio::spawn(async move { engine.rollout(&rollout_id).await }))
    }

    /// The class-method form: run a rollout to completion (forward pass,
    /// then rollback if it failed and wasn't skipped).
    #[instrument(skip(self), fields(rollout_id = %rollout_id))]
    pub async fn rollout(&self, rollout_id: &RolloutId) -> Result<(), EngineError> {
        // Require a root task before mutating any lifecycle state.
        self.store.root_task(rollout_id)?;

        let mut rollout = self.store.get_rollout(rollout_id)?;
        if rollout.has_started() {
            return Err(PreconditionError::RolloutAlreadyStarted {
                started_at_ms: rollout.rollout_start_ms.unwrap_or_default(),
            }
            .into());
        }

        rollout.rollout_start_ms = Some(self.clock.now_ms());
        self.store.save_rollout(rollout.clone())?;

        self.signals.make_all(rollout_id, &SignalName::ROLLOUT_PHASE);
        let abort = self.signals.get(rollout_id, SignalName::AbortRollout).unwrap_or_default();
        let term = self.signals.get(rollout_id, SignalName::TermRollout).unwrap_or_default();
        let monitoring = self.signals.get(rollout_id, SignalName::Monitoring).unwrap_or_default();

        monitoring.set();
        self.start_monitors(&rollout, monitoring.clone(), abort.clone());

        let log_path = rollout_log_path(&self.config.log_dir, rollout_id, "rollout");
        let scope = ActionLogScope::open(&log_path).ok();

        let root_id = self.store.root_task(rollout_id)?.id;
        let ctx = self.engine_context();
        let (abort_for_run, term_for_run) = (abort.clone(), term.clone());
        let abort_for_wait = abort.clone();
        let run_and_wait = async move {
            let harness = ThreadHarness::spawn(async move {
                run_task(&ctx, &root_id, abort_for_run, term_for_run).await.map(|_| ()).map_err(action_error_to_failure)
            });
            harness.wait(&abort_for_wait).await;
        };
        match &scope {
            Some(scope) => run_and_wait.with_subscriber(scope.dispatch()).await,
            None => run_and_wait.await,
        }

        // Clear the latch itself, not just the bus entry: every monitor was
        // handed a clone of the same `Arc<AtomicBool>` in `start_monitors`,
        // so clearing it is what actually lets a monitor polling
        // `monitoring.is_set()` notice and return. Destroying the bus entry
        // alone would leave those clones permanently latched `true`.
        monitoring.clear();
        self.signals.destroy(rollout_id, SignalName::Monitoring);

        let failed = abort.is_set() || term.is_set();
        let skip_rollback = self.signals.is_set(rollout_id, SignalName::SkipRollback);

        let outcome = if failed && !skip_rollback {
            self.finish_eagerly(rollout_id)?;
            self.rollback(rollout_id).await
        } else {
            Ok(())
        };

        self.finish_eagerly(rollout_id)?;
        self.signals.destroy_all(rollout_id, &SignalName::ROLLOUT_PHASE);

        outcome
    }

    fn finish_eagerly(&self, rollout_id: &RolloutId) -> Result<(), EngineError> {
        let mut rollout = self.store.get_rollout(rollout_id)?;
        if rollout.rollout_finish_ms.is_none() {
            rollout.rollout_finish_ms = Some(self.clock.now_ms());
            self.store.save_rollout(rollout)?;
        }
        Ok(())
    }

    fn start_monitors(
        &self,
        rollout: &RolloutRecord,
        monitoring: ro_core::SignalHandle,
        abort: ro_core::SignalHandle,
    ) {
        for name in rollout.monitor_names() {
            let Some(monitor) = self.monitors.get(&name) else {
                tracing::warn!(monitor = %name, "monitor name not found in registry, skipping");
                continue;
            };
            let monitoring = monitoring.clone();
            let abort = abort.clone();
            tokio::spawn(async move {
                monitor.watch(monitoring, abort).await;
            });
        }
    }

    /// Revert the root task, recursively reverting children via composite
    /// executors using each subtree's recorded execution order.
    #[instrument(skip(self), fields(rollout_id = %rollout_id))]
    pub async fn rollback(&self, rollout_id: &RolloutId) -> Result<(), EngineError> {
        let mut rollout = self.store.get_rollout(rollout_id)?;
        rollout.rollback_start_ms = Some(self.clock.now_ms());
        self.store.save_rollout(rollout.clone())?;

        self.signals.make_all(rollout_id, &SignalName::ROLLBACK_PHASE);
        let abort = self.signals.get(rollout_id, SignalName::AbortRollback).unwrap_or_default();
        let term = self.signals.get(rollout_id, SignalName::TermRollback).unwrap_or_default();

        let log_path = rollout_log_path(&self.config.log_dir, rollout_id, "rollback");
        let scope = ActionLogScope::open(&log_path).ok();

        let root_id = self.store.root_task(rollout_id)?.id;
        let ctx = self.engine_context();
        let (abort_for_run, term_for_run) = (abort.clone(), term.clone());
        let abort_for_wait = abort.clone();
        let revert_and_wait = async move {
            let harness = ThreadHarness::spawn(async move {
                ro_engine::revert_task(&ctx, &root_id, abort_for_run, term_for_run)
                    .await
                    .map(|_| ())
                    .map_err(action_error_to_failure)
            });
            harness.wait(&abort_for_wait).await
        };
        let failure = match &scope {
            Some(scope) => revert_and_wait.with_subscriber(scope.dispatch()).await,
            None => revert_and_wait.await,
        };

        let mut rollout = self.store.get_rollout(rollout_id)?;
        rollout.rollback_finish_ms = Some(self.clock.now_ms());
        self.store.save_rollout(rollout)?;

        self.signals.destroy_all(rollout_id, &SignalName::ROLLBACK_PHASE);

        match failure {
            Some(failure) => Err(ActionError::Task(failure).into()),
            None => Ok(()),
        }
    }

    /// `succeeded` iff the signal currently exists, was unset, and is now
    /// latched by this call.
    pub fn signal(&self, rollout_id: &RolloutId, name: SignalName) -> SignalOutcome {
        if self.signals.set(rollout_id, name) {
            SignalOutcome::Succeeded
        } else {
            SignalOutcome::Failed
        }
    }

    pub fn can_signal(&self, rollout_id: &RolloutId, name: SignalName) -> bool {
        self.signals.can_signal(rollout_id, name)
    }

    pub fn status(&self, rollout_id: &RolloutId) -> Result<RolloutStatus, EngineError> {
        let rollout = self.store.get_rollout(rollout_id)?;
        Ok(self.derive_status(rollout_id, &rollout))
    }

    fn derive_status(&self, rollout_id: &RolloutId, rollout: &RolloutRecord) -> RolloutStatus {
        if rollout.rollout_start_ms.is_none() {
            return RolloutStatus::NotStarted;
        }

        if rollout.rollback_start_ms.is_none() {
            if self.signals.is_set(rollout_id, SignalName::TermRollout) {
                return RolloutStatus::TerminatingRollout;
            }
            if self.signals.is_set(rollout_id, SignalName::AbortRollout) {
                return RolloutStatus::AbortingRollout;
            }
            if rollout.rollout_finish_ms.is_none() {
                return RolloutStatus::Started;
            }
            RolloutStatus::Finished
        } else {
            if self.signals.is_set(rollout_id, SignalName::TermRollback) {
                return RolloutStatus::TerminatingRollback;
            }
            if self.signals.is_set(rollout_id, SignalName::AbortRollback) {
                return RolloutStatus::AbortingRollback;
            }
            if rollout.rollback_finish_ms.is_none() {
                return RolloutStatus::RollingBack;
            }
            RolloutStatus::RolledBack
        }
    }

    /// `Not started` / `Started at …` / `Finished` / `Rolling back at …` /
    /// `Rolled back` — a human-readable status string for CLI display.
    /// Purely cosmetic: no behavioral effect on the engine.
    pub fn friendly_status(&self, rollout_id: &RolloutId) -> Result<String, EngineError> {
        let rollout = self.store.get_rollout(rollout_id)?;
        Ok(match self.derive_status(rollout_id, &rollout) {
            RolloutStatus::NotStarted => "Not started".to_string(),
            RolloutStatus::Started | RolloutStatus::TerminatingRollout | RolloutStatus::AbortingRollout => {
                format!("Started at {}", rollout.rollout_start_ms.unwrap_or_default())
            }
            RolloutStatus::Finished => "Finished".to_string(),
            RolloutStatus::RollingBack
            | RolloutStatus::TerminatingRollback
            | RolloutStatus::AbortingRollback => {
                format!("Rolling back at {}", rollout.rollback_start_ms.unwrap_or_default())
            }
            RolloutStatus::RolledBack => "Rolled back".to_string(),
        })
    }

    /// Renders one action's start/finish pair (`rollout` or `rollback`) as
    /// a display string.
    pub fn friendly_action_status(&self, rollout_id: &RolloutId, action: &str) -> Result<String, EngineError> {
        let rollout = self.store.get_rollout(rollout_id)?;
        let (start_ms, finish_ms) = match action {
            "rollout" => (rollout.rollout_start_ms, rollout.rollout_finish_ms),
            "rollback" => (rollout.rollback_start_ms, rollout.rollback_finish_ms),
            other => return Ok(format!("unknown action: {other}")),
        };
        Ok(match (start_ms, finish_ms) {
            (Some(start), None) => format!("Started at {start}"),
            (Some(start), Some(finish)) => format!("{start} - {finish}"),
            (None, None) => "Not started".to_string(),
            (None, Some(finish)) => format!("Error: no start time, finished {finish}"),
        })
    }

    /// A listing filter, no effect on execution.
    pub fn hide(&self, rollout_id: &RolloutId) -> Result<(), EngineError> {
        let mut rollout = self.store.get_rollout(rollout_id)?;
        rollout.hidden = true;
        self.store.save_rollout(rollout)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
