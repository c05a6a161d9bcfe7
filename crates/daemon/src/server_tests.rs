// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cortex_core::{
    Alert, DwellDefaults, Event, FakeClock, IcingaAlert, Rule, Script, SequentialIdGen,
};
use cortex_storage::{LocalLog, StateMachine, Store};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

type TestServer = Server<LocalLog, FakeClock, SequentialIdGen>;

fn server() -> (TestServer, LocalLog) {
    let clock = FakeClock::new();
    let log = LocalLog::in_memory(StateMachine::new(Arc::new(Store::new()), 100));
    let node = Node::new(
        log.clone(),
        clock,
        SequentialIdGen::new("id"),
        DwellDefaults::default(),
    );
    (Server::new(node, "node-1"), log)
}

#[tokio::test]
async fn ping_and_hello() {
    let (mut server, _) = server();

    assert_eq!(server.handle_request(Request::Ping).await, Response::Pong);
    assert_eq!(
        server
            .handle_request(Request::Hello {
                version: "0".to_string()
            })
            .await,
        Response::Hello {
            version: PROTOCOL_VERSION.to_string()
        }
    );
}

#[tokio::test]
async fn add_rule_returns_stored_rule_with_generated_id() {
    let (mut server, _) = server();

    let response = server
        .handle_request(Request::AddRule {
            rule: Rule::new("", ["acme.*"], "http://hooks/a"),
        })
        .await;

    let Response::Rule { rule: Some(rule) } = response else {
        panic!("unexpected response: {:?}", response);
    };
    assert_eq!(rule.id, "id-1");
    assert_eq!(rule.dwell, DwellDefaults::default().dwell);

    let listed = server.handle_request(Request::ListRules).await;
    assert_eq!(listed, Response::Rules { rules: vec![*rule] });
}

#[tokio::test]
async fn invalid_rule_is_reported_as_error() {
    let (mut server, _) = server();

    let response = server
        .handle_request(Request::AddRule {
            rule: Rule::new("bad", ["acme..disk"], "http://hooks/a"),
        })
        .await;

    assert!(matches!(response, Response::Error { .. }), "{:?}", response);
}

#[tokio::test]
async fn stash_reports_match_count() {
    let (mut server, log) = server();
    server
        .handle_request(Request::AddRule {
            rule: Rule::new("disk", ["icinga.*"], "http://hooks/a"),
        })
        .await;

    let response = server
        .handle_request(Request::Stash {
            event: Event::new("icinga.disk", "icinga", json!({})),
        })
        .await;
    assert_eq!(response, Response::Stashed { matched: 1 });

    let response = server
        .handle_request(Request::Stash {
            event: Event::new("azure.vm", "azure", json!({})),
        })
        .await;
    assert_eq!(response, Response::Stashed { matched: 0 });
    assert_eq!(log.store().buckets.len(), 1);
}

#[tokio::test]
async fn stash_alert_converts_sink_payload() {
    let (mut server, _) = server();
    server
        .handle_request(Request::AddRule {
            rule: Rule::new("icinga", ["icinga.*.*.*"], "http://hooks/a"),
        })
        .await;

    let response = server
        .handle_request(Request::StashAlert {
            alert: Alert::Icinga(IcingaAlert {
                service_description: "disk".to_string(),
                host_alias: "web-1".to_string(),
                service_output: "critical".to_string(),
                ..IcingaAlert::default()
            }),
        })
        .await;

    assert_eq!(response, Response::Stashed { matched: 1 });
}

#[tokio::test]
async fn script_lifecycle() {
    let (mut server, _) = server();
    let script = Script::new("echo", "{{ bucket | tojson }}");

    assert_eq!(
        server
            .handle_request(Request::AddScript {
                script: script.clone()
            })
            .await,
        Response::Ok
    );
    assert!(matches!(
        server
            .handle_request(Request::AddScript {
                script: script.clone()
            })
            .await,
        Response::Error { .. }
    ));
    assert_eq!(
        server.handle_request(Request::ListScripts).await,
        Response::Scripts {
            script_ids: vec!["echo".to_string()]
        }
    );
    assert_eq!(
        server
            .handle_request(Request::GetScript {
                script_id: "echo".to_string()
            })
            .await,
        Response::Script {
            script: Some(script)
        }
    );
    assert_eq!(
        server
            .handle_request(Request::RemoveScript {
                script_id: "echo".to_string()
            })
            .await,
        Response::Ok
    );
    assert_eq!(
        server
            .handle_request(Request::GetScript {
                script_id: "echo".to_string()
            })
            .await,
        Response::Script { script: None }
    );
}

#[tokio::test]
async fn follower_rejects_writes_but_serves_reads() {
    let (mut server, log) = server();
    server
        .handle_request(Request::AddRule {
            rule: Rule::new("disk", ["icinga.*"], "http://hooks/a"),
        })
        .await;
    log.set_leader(false);

    let response = server
        .handle_request(Request::RemoveRule {
            rule_id: "disk".to_string(),
        })
        .await;
    assert!(matches!(response, Response::Error { .. }));

    let Response::Rule { rule } = server
        .handle_request(Request::GetRule {
            rule_id: "disk".to_string(),
        })
        .await
    else {
        panic!("expected rule response");
    };
    assert!(rule.is_some());
}

#[tokio::test]
async fn status_reports_table_sizes() {
    let (mut server, _) = server();
    server
        .handle_request(Request::AddRule {
            rule: Rule::new("disk", ["icinga.*"], "http://hooks/a"),
        })
        .await;

    let Response::Status {
        node_id,
        leader,
        rules,
        buckets,
        ..
    } = server.handle_request(Request::Status).await
    else {
        panic!("expected status response");
    };

    assert_eq!(node_id, "node-1");
    assert!(leader);
    assert_eq!(rules, 1);
    assert_eq!(buckets, 0);
}

#[tokio::test]
async fn shutdown_sets_flag() {
    let (mut server, _) = server();

    let response = server.handle_request(Request::Shutdown).await;

    assert_eq!(response, Response::ShuttingDown);
    assert!(server.shutdown_requested);
}

#[tokio::test]
async fn serves_requests_over_unix_socket() {
    let dir = tempfile::tempdir().unwrap();
    let socket_path = dir.path().join("test.sock");
    let listener = tokio::net::UnixListener::bind(&socket_path).unwrap();
    let (mut server, _) = server();

    let serve = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        server.handle_connection(stream).await.unwrap();
    });

    let response = protocol::call(&socket_path, &Request::Ping, Duration::from_secs(5))
        .await
        .unwrap();
    serve.await.unwrap();

    assert_eq!(response, Response::Pong);
}
