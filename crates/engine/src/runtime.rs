// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime owning the background loops

use crate::executor::Executor;
use crate::scheduler::FlushScheduler;
use cortex_adapters::{HookSender, ScriptEngine};
use cortex_core::{Clock, Config, IdGen};
use cortex_storage::{LogError, ReplicatedLog};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Background loop settings
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub flush_interval: Duration,
    pub queue_capacity: usize,
    /// Log payloads instead of posting them
    pub disable_post_hook: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            flush_interval: Duration::from_secs(1),
            queue_capacity: 100,
            disable_post_hook: false,
        }
    }
}

impl From<&Config> for RuntimeConfig {
    fn from(config: &Config) -> Self {
        Self {
            flush_interval: config.flush_interval,
            queue_capacity: config.queue_capacity,
            disable_post_hook: config.disable_post_hook,
        }
    }
}

/// Runtime adapter dependencies
pub struct RuntimeDeps<L, S, H, C, I> {
    pub log: L,
    pub scripts: S,
    pub hooks: H,
    pub clock: C,
    pub id_gen: I,
}

/// Runs the flush scheduler and executor until shut down
pub struct Runtime<L> {
    log: L,
    stop: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl<L: ReplicatedLog> Runtime<L> {
    /// Spawn both loops on the current tokio runtime
    pub fn start<S, H, C, I>(deps: RuntimeDeps<L, S, H, C, I>, config: RuntimeConfig) -> Self
    where
        S: ScriptEngine,
        H: HookSender,
        C: Clock,
        I: IdGen,
    {
        let (stop, shutdown) = watch::channel(false);
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));

        let scheduler = FlushScheduler::new(
            deps.log.clone(),
            deps.clock.clone(),
            tx,
            config.flush_interval,
        );
        let executor = Executor::new(
            deps.log.clone(),
            deps.scripts,
            deps.hooks,
            deps.clock,
            deps.id_gen,
        )
        .with_dev_mode(config.disable_post_hook)
        .with_pause(config.flush_interval);

        let handles = vec![
            tokio::spawn(scheduler.run(shutdown.clone())),
            tokio::spawn(executor.run(rx, shutdown)),
        ];
        tracing::info!(
            flush_interval_ms = config.flush_interval.as_millis() as u64,
            queue_capacity = config.queue_capacity,
            dev_mode = config.disable_post_hook,
            "runtime started"
        );

        Self {
            log: deps.log,
            stop,
            handles,
        }
    }

    /// Stop both loops, wait for them, then shut the log down
    pub async fn shutdown(self) -> Result<(), LogError> {
        let _ = self.stop.send(true);
        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "background loop panicked");
            }
        }
        self.log.shutdown().await?;
        tracing::info!("runtime stopped");
        Ok(())
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
