// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::protocol::{self, Request, Response, DEFAULT_TIMEOUT};
use cortex_core::Rule;
use std::path::Path;

fn config(dir: &Path) -> Config {
    Config {
        node_id: "node-1".to_string(),
        data_dir: dir.to_path_buf(),
        ..Config::default()
    }
}

#[tokio::test]
async fn startup_binds_socket_and_writes_pid() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());

    let mut daemon = startup(&config).await.unwrap();

    assert!(config.socket_path().exists());
    let pid = std::fs::read_to_string(config.lock_path()).unwrap();
    assert_eq!(pid.trim(), std::process::id().to_string());

    daemon.shutdown().await.unwrap();
    assert!(!config.socket_path().exists());
    assert!(!config.lock_path().exists());
}

#[tokio::test]
async fn second_daemon_fails_to_lock_and_leaves_first_intact() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let mut first = startup(&config).await.unwrap();

    let second = startup(&config).await;

    assert!(matches!(second, Err(LifecycleError::LockFailed(_))));
    assert!(config.socket_path().exists());
    first.shutdown().await.unwrap();
}

#[tokio::test]
async fn state_is_restored_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());

    let mut daemon = startup(&config).await.unwrap();
    let response = daemon
        .server
        .handle_request(Request::AddRule {
            rule: Rule::new("disk", ["icinga.*"], "http://hooks/disk"),
        })
        .await;
    assert!(matches!(response, Response::Rule { rule: Some(_) }));
    daemon.shutdown().await.unwrap();
    drop(daemon);

    let mut daemon = startup(&config).await.unwrap();
    let rule = daemon.server.node().get_rule("disk").unwrap();
    assert_eq!(rule.event_type_patterns, vec!["icinga.*".to_string()]);
    daemon.shutdown().await.unwrap();
}

#[tokio::test]
async fn accepts_connections_on_socket() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let mut daemon = startup(&config).await.unwrap();
    let socket_path = config.socket_path();

    let client = tokio::spawn(async move {
        protocol::call(&socket_path, &Request::Ping, DEFAULT_TIMEOUT).await
    });
    let (stream, _) = daemon.listener.accept().await.unwrap();
    daemon.server.handle_connection(stream).await.unwrap();

    assert_eq!(client.await.unwrap().unwrap(), Response::Pong);
    daemon.shutdown().await.unwrap();
}
