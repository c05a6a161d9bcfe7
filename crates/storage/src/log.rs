// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Replicated command log
//!
//! [`ReplicatedLog`] is the write path for all correlation state: only the
//! leader may submit, and every submitted command is applied through the
//! [`CommandApplier`]. [`LocalLog`] is the single-node implementation,
//! durable through a WAL plus periodic snapshots.

use crate::snapshot::SnapshotError;
use crate::state::{Applied, CommandApplier, StateMachine, Store};
use crate::table::StoreError;
use crate::wal::{Wal, WalError};
use async_trait::async_trait;
use cortex_core::Command;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::Mutex;

pub const SNAPSHOT_FILE: &str = "state.snap";
pub const WAL_FILE: &str = "cortex.wal";

#[derive(Debug, Error)]
pub enum LogError {
    #[error("not leader")]
    NotLeader,
    #[error("log is shut down")]
    Closed,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("WAL error: {0}")]
    Wal(#[from] WalError),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait ReplicatedLog: Clone + Send + Sync + 'static {
    /// Whether this node may submit commands
    fn is_leader(&self) -> bool;

    /// Read access to the applied state
    fn store(&self) -> &Store;

    /// Replicate and apply a command
    async fn submit(&self, command: Command) -> Result<Applied, LogError>;

    /// Persist a snapshot of the applied state
    async fn snapshot(&self) -> Result<(), LogError>;

    /// Wait for in-flight submissions, then refuse new ones
    async fn shutdown(&self) -> Result<(), LogError>;
}

struct Writer {
    wal: Option<Wal>,
    since_snapshot: u64,
    closed: bool,
}

struct Inner {
    machine: StateMachine,
    writer: Mutex<Writer>,
    dir: Option<PathBuf>,
    leader: AtomicBool,
    snapshot_threshold: u64,
}

/// Single-node log. Leadership is a flag, on by default.
pub struct LocalLog {
    inner: Arc<Inner>,
}

impl Clone for LocalLog {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl LocalLog {
    /// A log with no durability, for tests and dev mode
    pub fn in_memory(machine: StateMachine) -> Self {
        Self::build(machine, None, None, 0)
    }

    /// Open a durable log in `dir`: restore the latest snapshot, then
    /// replay the WAL on top of it.
    pub fn open(
        dir: &Path,
        machine: StateMachine,
        snapshot_threshold: u64,
    ) -> Result<Self, LogError> {
        let start = Instant::now();
        fs::create_dir_all(dir)?;

        let snapshot_path = dir.join(SNAPSHOT_FILE);
        if snapshot_path.exists() {
            let mut reader = BufReader::new(File::open(&snapshot_path)?);
            machine.restore(&mut reader)?;
        }

        let wal_path = dir.join(WAL_FILE);
        let commands = Wal::replay(&wal_path)?;
        let replayed = commands.len();
        for command in commands {
            let op = command.name();
            // Failed applies failed identically when first submitted
            if let Err(e) = machine.apply(command) {
                tracing::debug!(op, error = %e, "replayed command failed");
            }
        }
        let wal = Wal::open(&wal_path)?;

        tracing::info!(
            dir = %dir.display(),
            replayed,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "opened command log"
        );
        Ok(Self::build(
            machine,
            Some(wal),
            Some(dir.to_path_buf()),
            snapshot_threshold,
        ))
    }

    fn build(
        machine: StateMachine,
        wal: Option<Wal>,
        dir: Option<PathBuf>,
        snapshot_threshold: u64,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                machine,
                writer: Mutex::new(Writer {
                    wal,
                    since_snapshot: 0,
                    closed: false,
                }),
                dir,
                leader: AtomicBool::new(true),
                snapshot_threshold,
            }),
        }
    }

    pub fn set_leader(&self, leader: bool) {
        let was = self.inner.leader.swap(leader, Ordering::SeqCst);
        if was != leader {
            tracing::info!(leader, "leadership changed");
        }
    }

    pub fn machine(&self) -> &StateMachine {
        &self.inner.machine
    }

    fn write_snapshot(&self, writer: &mut Writer) -> Result<(), LogError> {
        let Some(dir) = &self.inner.dir else {
            return Ok(());
        };
        let start = Instant::now();
        let source = self.inner.machine.snapshot();
        let tmp = dir.join(format!("{}.tmp", SNAPSHOT_FILE));
        {
            let file = File::create(&tmp)?;
            let mut out = BufWriter::new(file);
            source.write_to(&mut out)?;
            out.into_inner().map_err(|e| e.into_error())?.sync_all()?;
        }
        fs::rename(&tmp, dir.join(SNAPSHOT_FILE))?;
        if let Some(wal) = writer.wal.as_mut() {
            wal.truncate()?;
        }
        writer.since_snapshot = 0;
        tracing::info!(
            rules = source.rules.len(),
            scripts = source.scripts.len(),
            records = source.records.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "wrote snapshot"
        );
        Ok(())
    }
}

#[async_trait]
impl ReplicatedLog for LocalLog {
    fn is_leader(&self) -> bool {
        self.inner.leader.load(Ordering::SeqCst)
    }

    fn store(&self) -> &Store {
        self.inner.machine.store()
    }

    async fn submit(&self, command: Command) -> Result<Applied, LogError> {
        if !self.is_leader() {
            return Err(LogError::NotLeader);
        }
        let mut writer = self.inner.writer.lock().await;
        if writer.closed {
            return Err(LogError::Closed);
        }
        // Leadership may have moved while waiting for the writer
        if !self.is_leader() {
            return Err(LogError::NotLeader);
        }

        let op = command.name();
        if let Some(wal) = writer.wal.as_mut() {
            wal.append(&command)?;
        }
        let result = self.inner.machine.apply(command);
        tracing::trace!(op, ok = result.is_ok(), "applied command");

        writer.since_snapshot += 1;
        let threshold = self.inner.snapshot_threshold;
        if threshold > 0 && writer.since_snapshot >= threshold {
            if let Err(e) = self.write_snapshot(&mut writer) {
                tracing::warn!(error = %e, "automatic snapshot failed");
            }
        }

        Ok(result?)
    }

    async fn snapshot(&self) -> Result<(), LogError> {
        let mut writer = self.inner.writer.lock().await;
        if writer.closed {
            return Err(LogError::Closed);
        }
        self.write_snapshot(&mut writer)
    }

    async fn shutdown(&self) -> Result<(), LogError> {
        let mut writer = self.inner.writer.lock().await;
        if writer.closed {
            return Ok(());
        }
        writer.closed = true;
        if let Some(wal) = writer.wal.take() {
            tracing::info!(sequence = wal.sequence(), "closed command log");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
