// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cortex_adapters::{FakeHookSender, FakeScriptEngine};
use cortex_core::{Command, Event, FakeClock, Rule, SequentialIdGen};
use cortex_storage::{LocalLog, StateMachine, Store};
use serde_json::json;
use std::sync::Arc;

fn config() -> RuntimeConfig {
    RuntimeConfig {
        flush_interval: Duration::from_millis(5),
        queue_capacity: 4,
        disable_post_hook: false,
    }
}

#[test]
fn config_from_node_config() {
    let node_config = Config {
        flush_interval: Duration::from_millis(250),
        queue_capacity: 7,
        disable_post_hook: true,
        ..Config::default()
    };

    let config = RuntimeConfig::from(&node_config);

    assert_eq!(config.flush_interval, Duration::from_millis(250));
    assert_eq!(config.queue_capacity, 7);
    assert!(config.disable_post_hook);
}

#[tokio::test]
async fn flushes_executes_and_shuts_down() {
    let clock = FakeClock::new();
    let log = LocalLog::in_memory(StateMachine::new(Arc::new(Store::new()), 100));
    let hooks = FakeHookSender::new();
    log.submit(Command::AddRule {
        rule: Rule::new("r1", ["acme.*"], "http://hooks/r1").with_dwell(1000, 800, 2000),
    })
    .await
    .unwrap();
    log.submit(Command::Stash {
        rule_id: "r1".to_string(),
        event: Event::new("acme.prod", "icinga", json!({})),
        at: clock.now(),
    })
    .await
    .unwrap();

    let runtime = Runtime::start(
        RuntimeDeps {
            log: log.clone(),
            scripts: FakeScriptEngine::new(),
            hooks: hooks.clone(),
            clock: clock.clone(),
            id_gen: SequentialIdGen::new("rec"),
        },
        config(),
    );
    clock.advance_ms(1000);
    while log.store().records.is_empty() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    runtime.shutdown().await.unwrap();

    assert_eq!(hooks.calls().len(), 1);
    assert!(log.store().buckets.is_empty());
    assert!(log.submit(Command::RemoveRule { rule_id: "r1".to_string() }).await.is_err());
}
