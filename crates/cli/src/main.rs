// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Rollout Contributors

//! `ro`: a demo CLI wiring the control surface (`RolloutEngine`) to a fresh
//! in-process `MemStore` and a representative task tree. Every invocation
//! starts from an empty store — there is no daemon process behind it — so
//! each subcommand generates its own rollout rather than looking one up.

mod demo;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ro_core::{RolloutId, SignalName, SystemClock};
use ro_daemon::{Config, MonitorRegistry, RolloutEngine, SignalBus};
use ro_engine::TaskRegistry;
use ro_storage::{MemStore, Store};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "ro", version, about = "Rollout orchestration demo CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a demo task tree for a new rollout and print it.
    GenerateTasks {
        /// Label recorded on the rollout (for display only).
        label: String,
    },
    /// Generate a demo task tree, then run it to completion.
    Rollout {
        label: String,
        /// Start the rollout detached via `rollout_async`, then wait on it.
        #[arg(long)]
        r#async: bool,
        /// Seconds each leaf delay task waits.
        #[arg(long, default_value_t = 1)]
        delay_secs: u64,
    },
    /// Generate a demo tree sized to give a signal a window to land in,
    /// start it, send the signal as soon as it becomes settable, then
    /// report the outcome.
    Signal {
        label: String,
        /// One of: abort_rollout, term_rollout, skip_rollback, abort_rollback,
        /// term_rollback, monitoring.
        name: String,
        #[arg(long, default_value_t = 5)]
        delay_secs: u64,
    },
    /// Generate a demo tree (not started) and print its status.
    Status { label: String },
    /// Generate a demo rollout and hide it from default listings.
    Hide { label: String },
}

fn build_engine() -> (RolloutEngine, Arc<MemStore>) {
    let store = Arc::new(MemStore::new());
    let engine = RolloutEngine::new(
        store.clone() as Arc<dyn Store>,
        Arc::new(TaskRegistry::standard()),
        Arc::new(SystemClock),
        Arc::new(SignalBus::new()),
        Arc::new(MonitorRegistry::new()),
        Config::default(),
    );
    (engine, store)
}

fn seed(engine: &RolloutEngine, store: &Arc<MemStore>, label: &str, delay_secs: u64) -> Result<RolloutId> {
    let rollout = store.create_rollout(serde_json::json!({ "label": label }));
    let rollout_id = rollout.id.clone();
    engine
        .generate_tasks(&rollout_id, |store, rollout_id| {
            demo::build(store, rollout_id, delay_secs);
        })
        .context("generating the demo task tree")?;
    Ok(rollout_id)
}

fn print_tree(store: &Arc<MemStore>, rollout_id: &RolloutId) {
    println!("rollout {rollout_id}");
    for task in store.list_tasks_for_rollout(rollout_id) {
        let indent = if task.is_root() { "" } else { "  " };
        if task.task_type == "delay" {
            println!("{indent}{} [{}] {}", task.id, task.task_type, ro_engine::delay_friendly_str(&task.state));
        } else {
            println!("{indent}{} [{}]", task.id, task.task_type);
        }
    }
}

async fn cmd_generate_tasks(label: String) -> Result<()> {
    let (engine, store) = build_engine();
    let rollout_id = seed(&engine, &store, &label, 1)?;
    print_tree(&store, &rollout_id);
    Ok(())
}

async fn cmd_rollout(label: String, is_async: bool, delay_secs: u64) -> Result<()> {
    let (engine, store) = build_engine();
    let rollout_id = seed(&engine, &store, &label, delay_secs)?;

    let outcome = if is_async {
        engine.rollout_async(&rollout_id).context("starting rollout_async")?.await??;
        Ok(())
    } else {
        engine.rollout(&rollout_id).await
    };

    match outcome {
        Ok(()) => println!("rollout {rollout_id} finished: {}", engine.status(&rollout_id)?),
        Err(err) => println!("rollout {rollout_id} failed ({err}), ended: {}", engine.status(&rollout_id)?),
    }
    Ok(())
}

async fn cmd_signal(label: String, name: String, delay_secs: u64) -> Result<()> {
    let signal_name = SignalName::parse(&name).with_context(|| format!("unknown signal name: {name}"))?;

    let (engine, store) = build_engine();
    let rollout_id = seed(&engine, &store, &label, delay_secs)?;

    let engine_for_task = engine.clone();
    let rollout_id_for_task = rollout_id.clone();
    let handle = tokio::spawn(async move { engine_for_task.rollout(&rollout_id_for_task).await });

    let mut attempts = 0;
    loop {
        if engine.can_signal(&rollout_id, signal_name) {
            break;
        }
        attempts += 1;
        if attempts >= 10_000 {
            bail!("signal {signal_name} never became available to set");
        }
        tokio::task::yield_now().await;
    }

    let outcome = engine.signal(&rollout_id, signal_name);
    println!("signal {signal_name}: {outcome:?}");

    let result = handle.await.context("joining the rollout task")?;
    match result {
        Ok(()) => println!("rollout {rollout_id} finished: {}", engine.status(&rollout_id)?),
        Err(err) => println!("rollout {rollout_id} failed ({err}), ended: {}", engine.status(&rollout_id)?),
    }
    Ok(())
}

async fn cmd_status(label: String) -> Result<()> {
    let (engine, store) = build_engine();
    let rollout_id = seed(&engine, &store, &label, 1)?;
    println!("rollout {rollout_id}: {} ({})", engine.status(&rollout_id)?, engine.friendly_status(&rollout_id)?);
    Ok(())
}

async fn cmd_hide(label: String) -> Result<()> {
    let (engine, store) = build_engine();
    let rollout_id = seed(&engine, &store, &label, 1)?;
    engine.hide(&rollout_id)?;
    println!("rollout {rollout_id} hidden");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    match cli.command {
        Command::GenerateTasks { label } => cmd_generate_tasks(label).await,
        Command::Rollout { label, r#async, delay_secs } => cmd_rollout(label, r#async, delay_secs).await,
        Command::Signal { label, name, delay_secs } => cmd_signal(label, name, delay_secs).await,
        Command::Status { label } => cmd_status(label).await,
        Command::Hide { label } => cmd_hide(label).await,
    }
}
