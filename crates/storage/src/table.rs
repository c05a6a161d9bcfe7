// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Keyed in-memory tables
//!
//! Each table owns its own lock. Operations take the lock for the duration
//! of a single call and never hold it across tables.

use chrono::{DateTime, Utc};
use cortex_core::{Bucket, Event, ExecutionRecord, PatternError, Rule, Script};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

/// Errors from storage map operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: &'static str, id: String },
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error(transparent)]
    InvalidPattern(#[from] PatternError),
}

/// A value stored in a [`Table`] under its own identifier
pub trait Keyed: Clone + Send + Sync + 'static {
    const KIND: &'static str;
    fn key(&self) -> &str;
}

impl Keyed for Rule {
    const KIND: &'static str = "rule";
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Script {
    const KIND: &'static str = "script";
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for ExecutionRecord {
    const KIND: &'static str = "record";
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Bucket {
    const KIND: &'static str = "bucket";
    fn key(&self) -> &str {
        self.rule_id()
    }
}

pub struct Table<T> {
    entries: RwLock<HashMap<String, T>>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<T: Keyed> Table<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, T>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, T>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    fn not_found(id: &str) -> StoreError {
        StoreError::NotFound {
            kind: T::KIND,
            id: id.to_string(),
        }
    }

    pub fn add(&self, value: T) -> Result<(), StoreError> {
        let mut entries = self.write();
        if entries.contains_key(value.key()) {
            return Err(StoreError::AlreadyExists {
                kind: T::KIND,
                id: value.key().to_string(),
            });
        }
        entries.insert(value.key().to_string(), value);
        Ok(())
    }

    /// Replace an existing value, returning the previous one
    pub fn update(&self, value: T) -> Result<T, StoreError> {
        let mut entries = self.write();
        match entries.get_mut(value.key()) {
            Some(slot) => Ok(std::mem::replace(slot, value)),
            None => Err(Self::not_found(value.key())),
        }
    }

    pub fn remove(&self, id: &str) -> Result<T, StoreError> {
        self.write().remove(id).ok_or_else(|| Self::not_found(id))
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.read().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read().contains_key(id)
    }

    /// All values, sorted by key
    pub fn list(&self) -> Vec<T> {
        let mut values: Vec<T> = self.read().values().cloned().collect();
        values.sort_by(|a, b| a.key().cmp(b.key()));
        values
    }

    /// All keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Copy of the whole table for snapshotting
    pub fn clone_map(&self) -> HashMap<String, T> {
        self.read().clone()
    }

    /// Replace the whole table
    pub fn restore(&self, map: HashMap<String, T>) {
        *self.write() = map;
    }
}

/// Result of stashing an event into a rule's bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stashed {
    /// A new bucket was opened for the rule
    Created,
    /// The event joined the existing bucket
    Added,
    /// An equivalent occurrence was already in the bucket
    Duplicate,
}

impl Table<Bucket> {
    /// Add `event` to the bucket for `rule`, opening one if necessary
    pub fn stash(&self, rule: &Rule, event: Event, now: DateTime<Utc>) -> Stashed {
        let mut buckets = self.write();
        match buckets.get_mut(&rule.id) {
            None => {
                buckets.insert(rule.id.clone(), Bucket::new(rule.clone(), event, now));
                Stashed::Created
            }
            Some(bucket) if bucket.contains(&event) => Stashed::Duplicate,
            Some(bucket) => {
                bucket.add_event(event, now);
                Stashed::Added
            }
        }
    }

    /// Buckets whose dwell window has elapsed at `now`, oldest first
    pub fn flushable(&self, now: DateTime<Utc>) -> Vec<Bucket> {
        let mut ready: Vec<Bucket> = self
            .read()
            .values()
            .filter(|b| b.can_flush(now))
            .cloned()
            .collect();
        ready.sort_by(|a, b| {
            (a.created_at, a.rule_id()).cmp(&(b.created_at, b.rule_id()))
        });
        ready
    }
}

impl Table<ExecutionRecord> {
    /// Records produced for `rule_id`, oldest first
    pub fn for_rule(&self, rule_id: &str) -> Vec<ExecutionRecord> {
        let mut records: Vec<ExecutionRecord> = self
            .read()
            .values()
            .filter(|r| r.rule_id() == rule_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        records
    }

    pub fn count_for_rule(&self, rule_id: &str) -> usize {
        self.read().values().filter(|r| r.rule_id() == rule_id).count()
    }

    /// Insert a record, then evict the oldest records until at most
    /// `max_history` remain. Returns the evicted IDs.
    pub fn add_bounded(
        &self,
        record: ExecutionRecord,
        max_history: usize,
    ) -> Result<Vec<String>, StoreError> {
        let mut records = self.write();
        if records.contains_key(&record.id) {
            return Err(StoreError::AlreadyExists {
                kind: ExecutionRecord::KIND,
                id: record.id,
            });
        }
        records.insert(record.id.clone(), record);

        let excess = records.len().saturating_sub(max_history);
        if excess == 0 {
            return Ok(Vec::new());
        }
        let mut order: Vec<(DateTime<Utc>, String)> = records
            .values()
            .map(|r| (r.created_at, r.id.clone()))
            .collect();
        order.sort();
        let evicted: Vec<String> = order.into_iter().take(excess).map(|(_, id)| id).collect();
        for id in &evicted {
            records.remove(id);
        }
        Ok(evicted)
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
