// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifiers minted by the leader
//!
//! Three things get IDs on the write path: rules submitted without one,
//! events converted from sink payloads, and execution records. IDs are
//! generated before a command is submitted and travel inside it, so
//! followers and WAL replay never call an [`IdGen`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub trait IdGen: Clone + Send + Sync + 'static {
    fn next(&self) -> String;
}

/// Hyphenated UUIDv4, the form rule IDs take in `/rules/{id}` paths
#[derive(Clone, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self) -> String {
        uuid::Uuid::new_v4().hyphenated().to_string()
    }
}

/// Predictable `<prefix>-<n>` IDs for tests, e.g. `rule-1`, `rec-2`.
///
/// Clones share one counter, so a node and its executor handed clones of
/// the same generator never hand out the same ID twice.
#[derive(Clone)]
pub struct SequentialIdGen {
    prefix: String,
    issued: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            issued: Arc::new(AtomicU64::new(0)),
        }
    }

    /// How many IDs this generator and its clones have handed out
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new("rule")
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self) -> String {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}-{n}", self.prefix)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
