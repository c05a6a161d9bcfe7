// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bucket executor
//!
//! Runs the rule's script over a flushed bucket, posts the result (or the
//! raw bucket) to the rule's hook, and records the outcome through an
//! `add_record` command.

use crate::error::ExecuteError;
use cortex_adapters::{HookSender, ScriptEngine, ScriptOutcome};
use cortex_core::{Bucket, Clock, Command, ExecutionRecord, IdGen};
use cortex_storage::ReplicatedLog;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tracing::Instrument;

pub struct Executor<L, S, H, C, I> {
    log: L,
    scripts: S,
    hooks: H,
    clock: C,
    id_gen: I,
    /// Log payloads instead of posting them
    dev_mode: bool,
    /// How often a paused follower re-checks leadership
    pause: Duration,
}

impl<L, S, H, C, I> Executor<L, S, H, C, I>
where
    L: ReplicatedLog,
    S: ScriptEngine,
    H: HookSender,
    C: Clock,
    I: IdGen,
{
    pub fn new(log: L, scripts: S, hooks: H, clock: C, id_gen: I) -> Self {
        Self {
            log,
            scripts,
            hooks,
            clock,
            id_gen,
            dev_mode: false,
            pause: Duration::from_secs(1),
        }
    }

    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Script result for the bucket, `None` when there is nothing to apply
    async fn transform(
        &self,
        bucket: &Bucket,
        input: &serde_json::Value,
    ) -> Option<serde_json::Value> {
        let script_id = bucket.rule.script_id.as_deref()?;
        let Some(script) = self.log.store().scripts.get(script_id) else {
            tracing::warn!(script_id, "script not found, posting raw bucket");
            return None;
        };
        match self.scripts.execute(&script, input).await {
            ScriptOutcome::Value(value) => Some(value),
            ScriptOutcome::Nil => None,
            ScriptOutcome::Exception(message) => {
                tracing::warn!(script_id, error = %message, "script error, posting raw bucket");
                None
            }
        }
    }

    /// Execute one bucket and record the outcome
    pub async fn execute(&self, bucket: Bucket) -> Result<ExecutionRecord, ExecuteError> {
        let span = tracing::info_span!("execute", rule_id = %bucket.rule_id());
        async move {
            let start = Instant::now();
            let input = serde_json::to_value(&bucket)?;
            let script_result = self.transform(&bucket, &input).await;
            let payload = script_result.as_ref().unwrap_or(&input);

            let hook_status_code = if self.dev_mode {
                tracing::info!(
                    endpoint = %bucket.rule.hook_endpoint,
                    payload = %payload,
                    "post hook disabled"
                );
                0
            } else {
                match self
                    .hooks
                    .post(&bucket.rule.hook_endpoint, payload, bucket.rule.hook_retry)
                    .await
                {
                    Ok(status) => status,
                    Err(e) => {
                        tracing::warn!(error = %e, "hook delivery failed");
                        e.status_code()
                    }
                }
            };

            let record = ExecutionRecord {
                id: self.id_gen.next(),
                bucket,
                script_result,
                hook_status_code,
                created_at: self.clock.now(),
            };
            self.log
                .submit(Command::AddRecord {
                    record: Box::new(record.clone()),
                })
                .await?;

            tracing::info!(
                record_id = %record.id,
                events = record.bucket.events.len(),
                hook_status_code,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "executed bucket"
            );
            Ok(record)
        }
        .instrument(span)
        .await
    }

    /// Wait until this node leads again. Returns false on shutdown.
    async fn await_leadership(&self, shutdown: &mut watch::Receiver<bool>) -> bool {
        while !self.log.is_leader() {
            tokio::select! {
                _ = tokio::time::sleep(self.pause) => {}
                _ = shutdown.changed() => return false,
            }
        }
        !*shutdown.borrow()
    }

    /// Execute queued buckets one at a time until `shutdown` fires or the
    /// queue closes. Execution only happens while leader.
    pub async fn run(
        self,
        mut queue: mpsc::Receiver<Bucket>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        tracing::info!(dev_mode = self.dev_mode, "executor started");
        loop {
            if !self.await_leadership(&mut shutdown).await {
                break;
            }
            let bucket = tokio::select! {
                next = queue.recv() => match next {
                    Some(bucket) => bucket,
                    None => break,
                },
                _ = shutdown.changed() => break,
            };
            // Hold the bucket until leadership returns
            if !self.await_leadership(&mut shutdown).await {
                tracing::warn!(rule_id = bucket.rule_id(), "shutdown with bucket pending");
                break;
            }
            if let Err(e) = self.execute(bucket).await {
                tracing::error!(error = %e, "bucket execution failed");
            }
        }
        tracing::info!("executor stopped");
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
