// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dwell-window buckets
//!
//! A bucket accumulates the events matched by one rule. It becomes eligible
//! to flush once no event has arrived for `flush_wait` milliseconds. The
//! window starts at the rule's dwell and grows by one dwell whenever an
//! event arrives later than `dwell_deadline` after the previous one, until
//! the bucket is older than `max_dwell`. Past that age the window stops
//! growing, but a steady stream of events still keeps the bucket open:
//! `max_dwell` caps growth, it does not force a flush.

use crate::clock::elapsed_ms;
use crate::event::Event;
use crate::rule::Rule;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// The rule as it was when the bucket was opened
    pub rule: Rule,
    pub events: Vec<Event>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    flush_wait: u64,
}

impl Bucket {
    pub fn new(rule: Rule, event: Event, now: DateTime<Utc>) -> Self {
        let flush_wait = rule.dwell;
        Self {
            rule,
            events: vec![event],
            created_at: now,
            updated_at: now,
            flush_wait,
        }
    }

    pub fn rule_id(&self) -> &str {
        &self.rule.id
    }

    /// Current inactivity window in milliseconds
    pub fn flush_wait(&self) -> u64 {
        self.flush_wait
    }

    /// Whether an equivalent occurrence is already a member
    pub fn contains(&self, event: &Event) -> bool {
        self.events.iter().any(|e| e.is_same_occurrence(event))
    }

    /// Append an event and update the dwell window.
    ///
    /// Does not deduplicate; callers check [`Bucket::contains`] first.
    pub fn add_event(&mut self, event: Event, now: DateTime<Utc>) {
        self.events.push(event);
        self.update_dwell(now);
    }

    fn update_dwell(&mut self, now: DateTime<Utc>) {
        if elapsed_ms(self.created_at, now) < self.rule.max_dwell
            && elapsed_ms(self.updated_at, now) >= self.rule.dwell_deadline
        {
            self.flush_wait = self.flush_wait.saturating_add(self.rule.dwell);
        }
        self.updated_at = now;
    }

    pub fn can_flush(&self, now: DateTime<Utc>) -> bool {
        elapsed_ms(self.updated_at, now) >= self.flush_wait
    }

    /// Milliseconds until the bucket becomes flushable, zero if it already is
    pub fn flush_in(&self, now: DateTime<Utc>) -> u64 {
        self.flush_wait
            .saturating_sub(elapsed_ms(self.updated_at, now))
    }
}

#[cfg(test)]
#[path = "bucket_tests.rs"]
mod tests;
