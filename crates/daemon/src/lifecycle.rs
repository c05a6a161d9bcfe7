// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, shutdown, recovery.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use cortex_adapters::{HttpHookSender, TemplateScriptEngine, TracedHookSender, TracedScriptEngine};
use cortex_core::{Config, ConfigError, SystemClock, UuidIdGen};
use cortex_engine::{Node, Runtime, RuntimeConfig, RuntimeDeps};
use cortex_storage::{LocalLog, LogError, ReplicatedLog, StateMachine, Store};
use fs2::FileExt;
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};

use crate::server::Server;

/// Log backing the daemon
pub type DaemonLog = LocalLog;

/// Socket server with concrete adapter types
pub type DaemonServer = Server<DaemonLog, SystemClock, UuidIdGen>;

/// Daemon state during operation
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub listener: UnixListener,
    pub server: DaemonServer,
    runtime: Option<Runtime<DaemonLog>>,
}

impl DaemonState {
    pub fn shutdown_requested(&self) -> bool {
        self.server.shutdown_requested
    }

    /// Shutdown the daemon gracefully
    pub async fn shutdown(&mut self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");
        let start = Instant::now();

        // 1. Stop the background loops and close the log
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown().await?;
        }

        // 2. Remove socket file
        let socket_path = self.config.socket_path();
        if socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&socket_path) {
                warn!("Failed to remove socket file: {}", e);
            }
        }

        // 3. Remove PID file; the lock itself is released when lock_file drops
        let lock_path = self.config.lock_path();
        if lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }

        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Daemon shutdown complete"
        );
        Ok(())
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("Log error: {0}")]
    Log(#[from] LogError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon
pub async fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    std::fs::create_dir_all(&config.data_dir)?;

    // Acquire lock FIRST. A failed lock means another daemon owns the
    // socket and PID file, so there is nothing of ours to clean up.
    let mut lock_file = File::create(config.lock_path())?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;
    writeln!(lock_file, "{}", std::process::id())?;

    match startup_inner(config, lock_file).await {
        Ok(state) => Ok(state),
        Err(e) => {
            cleanup_on_failure(config);
            Err(e)
        }
    }
}

/// Inner startup logic - cleanup_on_failure called if this fails
async fn startup_inner(config: &Config, lock_file: File) -> Result<DaemonState, LifecycleError> {
    let start = Instant::now();

    // 1. Restore state from snapshot and WAL
    let machine = StateMachine::new(Arc::new(Store::new()), config.max_history);
    let log = LocalLog::open(&config.data_dir, machine, config.snapshot_threshold)?;
    let store = log.store();
    info!(
        rules = store.rules.len(),
        scripts = store.scripts.len(),
        records = store.records.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Loaded state"
    );

    // 2. Remove stale socket and bind (LAST - only after state loaded)
    let socket_path = config.socket_path();
    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if socket_path.exists() {
        std::fs::remove_file(&socket_path)?;
    }
    let listener = UnixListener::bind(&socket_path)
        .map_err(|e| LifecycleError::BindFailed(socket_path.clone(), e))?;

    // 3. Start flush scheduler and executor
    let runtime = Runtime::start(
        RuntimeDeps {
            log: log.clone(),
            scripts: TracedScriptEngine::new(TemplateScriptEngine::new()),
            hooks: TracedHookSender::new(HttpHookSender::new(config.hook_timeout)),
            clock: SystemClock,
            id_gen: UuidIdGen,
        },
        RuntimeConfig::from(config),
    );

    let node = Node::new(log, SystemClock, UuidIdGen, config.dwell_defaults());
    info!(node_id = %config.node_id, data_dir = %config.data_dir.display(), "Daemon started");

    Ok(DaemonState {
        config: config.clone(),
        lock_file,
        listener,
        server: Server::new(node, config.node_id.clone()),
        runtime: Some(runtime),
    })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    let socket_path = config.socket_path();
    if socket_path.exists() {
        let _ = std::fs::remove_file(&socket_path);
    }

    let lock_path = config.lock_path();
    if lock_path.exists() {
        let _ = std::fs::remove_file(&lock_path);
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
