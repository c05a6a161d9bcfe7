// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Flush scheduler
//!
//! Scans buckets on a fixed interval. Every bucket whose dwell window has
//! elapsed is removed through a `flush_bucket` command and the removed
//! bucket is queued for execution. Only the leader scans.

use cortex_core::{Bucket, Clock, Command};
use cortex_storage::{Applied, LogError, ReplicatedLog};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

pub struct FlushScheduler<L, C> {
    log: L,
    clock: C,
    queue: mpsc::Sender<Bucket>,
    interval: Duration,
}

impl<L: ReplicatedLog, C: Clock> FlushScheduler<L, C> {
    pub fn new(log: L, clock: C, queue: mpsc::Sender<Bucket>, interval: Duration) -> Self {
        Self {
            log,
            clock,
            queue,
            interval,
        }
    }

    /// Run one scan. Returns the number of buckets queued.
    pub async fn tick(&self) -> usize {
        if !self.log.is_leader() {
            return 0;
        }
        let ready = self.log.store().buckets.flushable(self.clock.now());
        let mut queued = 0;

        for candidate in ready {
            let rule_id = candidate.rule_id().to_string();
            let bucket = match self
                .log
                .submit(Command::FlushBucket {
                    rule_id: rule_id.clone(),
                })
                .await
            {
                Ok(Applied::Flushed(bucket)) => bucket,
                Ok(other) => {
                    tracing::warn!(rule_id, ?other, "unexpected flush result");
                    continue;
                }
                Err(LogError::NotLeader) => {
                    tracing::info!("lost leadership during flush scan");
                    break;
                }
                Err(e) => {
                    tracing::warn!(rule_id, error = %e, "flush failed");
                    continue;
                }
            };

            tracing::info!(
                rule_id,
                events = bucket.events.len(),
                flush_wait = bucket.flush_wait(),
                "flushing bucket"
            );
            // A full queue blocks here; the next scan picks up the rest
            if self.queue.send(*bucket).await.is_err() {
                tracing::warn!(rule_id, "execution queue closed, dropping bucket");
                break;
            }
            queued += 1;
        }
        queued
    }

    /// Scan every interval until `shutdown` fires
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "flush scheduler started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                _ = shutdown.changed() => break,
            }
            if *shutdown.borrow() {
                break;
            }
        }
        tracing::info!("flush scheduler stopped");
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
