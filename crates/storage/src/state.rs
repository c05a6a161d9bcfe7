// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Correlation state and the command applier
//!
//! [`Store`] holds the four tables. [`StateMachine`] is what the log calls
//! back into: it applies commands to a store, and produces and restores
//! snapshots of it.

use crate::snapshot::{SnapshotError, SnapshotSource};
use crate::table::{StoreError, Stashed, Table};
use chrono::{DateTime, Utc};
use cortex_core::{Bucket, Command, Event, ExecutionRecord, Rule, Script};
use std::io::Read;
use std::sync::Arc;

/// The storage maps
#[derive(Default)]
pub struct Store {
    pub rules: Table<Rule>,
    pub buckets: Table<Bucket>,
    pub scripts: Table<Script>,
    pub records: Table<ExecutionRecord>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }
}

/// What applying a command produced
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Done,
    Stashed(Stashed),
    /// The bucket removed by `flush_bucket`
    Flushed(Box<Bucket>),
}

/// Deterministic application of replicated commands
pub trait CommandApplier: Send + Sync + 'static {
    fn apply(&self, command: Command) -> Result<Applied, StoreError>;
    fn snapshot(&self) -> SnapshotSource;
    fn restore(&self, reader: &mut dyn Read) -> Result<(), SnapshotError>;
}

/// Applies commands using only what the command carries, so every replica
/// and every replay reaches the same state
pub struct StateMachine {
    store: Arc<Store>,
    max_history: usize,
}

impl StateMachine {
    pub fn new(store: Arc<Store>, max_history: usize) -> Self {
        Self { store, max_history }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    fn stash(&self, rule_id: &str, event: Event, at: DateTime<Utc>) -> Result<Stashed, StoreError> {
        let rule = self.store.rules.get(rule_id).ok_or_else(|| StoreError::NotFound {
            kind: "rule",
            id: rule_id.to_string(),
        })?;
        let outcome = self.store.buckets.stash(&rule, event, at);
        tracing::debug!(rule_id, ?outcome, "stashed event");
        Ok(outcome)
    }

    fn add_record(&self, record: ExecutionRecord) -> Result<(), StoreError> {
        let evicted = self.store.records.add_bounded(record, self.max_history)?;
        if !evicted.is_empty() {
            tracing::debug!(
                count = evicted.len(),
                max_history = self.max_history,
                "evicted execution records"
            );
        }
        Ok(())
    }
}

impl CommandApplier for StateMachine {
    fn apply(&self, command: Command) -> Result<Applied, StoreError> {
        let store = &self.store;
        match command {
            Command::Stash {
                rule_id,
                event,
                at,
            } => self.stash(&rule_id, event, at).map(Applied::Stashed),
            Command::AddRule { mut rule } => {
                rule.validate()?;
                store.rules.add(rule).map(|_| Applied::Done)
            }
            Command::UpdateRule { mut rule } => {
                rule.validate()?;
                store.rules.update(rule).map(|_| Applied::Done)
            }
            Command::RemoveRule { rule_id } => store.rules.remove(&rule_id).map(|_| Applied::Done),
            Command::FlushBucket { rule_id } => store
                .buckets
                .remove(&rule_id)
                .map(|b| Applied::Flushed(Box::new(b))),
            Command::AddScript { script } => store.scripts.add(script).map(|_| Applied::Done),
            Command::UpdateScript { script } => {
                store.scripts.update(script).map(|_| Applied::Done)
            }
            Command::RemoveScript { script_id } => {
                store.scripts.remove(&script_id).map(|_| Applied::Done)
            }
            Command::AddRecord { record } => self.add_record(*record).map(|_| Applied::Done),
            Command::RemoveRecord { record_id } => {
                store.records.remove(&record_id).map(|_| Applied::Done)
            }
        }
    }

    fn snapshot(&self) -> SnapshotSource {
        SnapshotSource {
            rules: self.store.rules.clone_map(),
            scripts: self.store.scripts.clone_map(),
            records: self.store.records.clone_map(),
        }
    }

    fn restore(&self, reader: &mut dyn Read) -> Result<(), SnapshotError> {
        let source = SnapshotSource::read_from(reader)?;
        tracing::info!(
            rules = source.rules.len(),
            scripts = source.scripts.len(),
            records = source.records.len(),
            "restoring from snapshot"
        );
        self.store.rules.restore(source.rules);
        self.store.scripts.restore(source.scripts);
        self.store.records.restore(source.records);
        self.store.buckets.restore(Default::default());
        Ok(())
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
