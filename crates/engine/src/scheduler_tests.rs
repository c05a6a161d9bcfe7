// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cortex_core::{Event, FakeClock, Rule};
use cortex_storage::{LocalLog, StateMachine, Store};
use serde_json::json;
use std::sync::Arc;

async fn setup(
    capacity: usize,
) -> (
    FlushScheduler<LocalLog, FakeClock>,
    LocalLog,
    FakeClock,
    mpsc::Receiver<Bucket>,
) {
    let clock = FakeClock::new();
    let log = LocalLog::in_memory(StateMachine::new(Arc::new(Store::new()), 100));
    let (tx, rx) = mpsc::channel(capacity);
    let scheduler = FlushScheduler::new(log.clone(), clock.clone(), tx, Duration::from_millis(10));
    (scheduler, log, clock, rx)
}

async fn add_rule_and_stash(log: &LocalLog, clock: &FakeClock, rule_id: &str, n: u64) {
    log.submit(Command::AddRule {
        rule: Rule::new(rule_id, ["acme.*"], "http://hook").with_dwell(1000, 800, 2000),
    })
    .await
    .unwrap();
    log.submit(Command::Stash {
        rule_id: rule_id.to_string(),
        event: Event::new("acme.prod", "icinga", json!({ "n": n })),
        at: clock.now(),
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn tick_flushes_only_elapsed_buckets() {
    let (scheduler, log, clock, mut rx) = setup(10).await;
    add_rule_and_stash(&log, &clock, "r1", 1).await;

    clock.advance_ms(999);
    assert_eq!(scheduler.tick().await, 0);
    assert_eq!(log.store().buckets.len(), 1);

    clock.advance_ms(1);
    assert_eq!(scheduler.tick().await, 1);

    let bucket = rx.recv().await.unwrap();
    assert_eq!(bucket.rule_id(), "r1");
    assert!(log.store().buckets.is_empty());
    assert_eq!(scheduler.tick().await, 0);
}

#[tokio::test]
async fn follower_does_not_flush() {
    let (scheduler, log, clock, mut rx) = setup(10).await;
    add_rule_and_stash(&log, &clock, "r1", 1).await;
    log.set_leader(false);
    clock.advance_ms(5000);

    assert_eq!(scheduler.tick().await, 0);
    assert_eq!(log.store().buckets.len(), 1);
    assert!(rx.try_recv().is_err());

    log.set_leader(true);
    assert_eq!(scheduler.tick().await, 1);
}

#[tokio::test]
async fn closed_queue_stops_scan() {
    let (scheduler, log, clock, rx) = setup(10).await;
    add_rule_and_stash(&log, &clock, "r1", 1).await;
    add_rule_and_stash(&log, &clock, "r2", 2).await;
    drop(rx);
    clock.advance_ms(1000);

    assert_eq!(scheduler.tick().await, 0);
    // the first bucket was flushed before the queue was found closed
    assert_eq!(log.store().buckets.len(), 1);
}

#[tokio::test]
async fn run_stops_on_shutdown() {
    let (scheduler, log, clock, mut rx) = setup(10).await;
    add_rule_and_stash(&log, &clock, "r1", 1).await;
    clock.advance_ms(1000);
    let (stop, shutdown) = watch::channel(false);

    let handle = tokio::spawn(scheduler.run(shutdown));
    let bucket = rx.recv().await.unwrap();
    assert_eq!(bucket.rule_id(), "r1");

    stop.send(true).unwrap();
    handle.await.unwrap();
}
