// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Protocol unit tests

use super::*;
use cortex_core::{IcingaAlert, Rule};
use serde_json::json;

#[test]
fn encode_decode_roundtrip_request() {
    let request = Request::AddRule {
        rule: Rule::new("disk", ["acme.*.check_disk"], "http://hooks/disk").with_hook_retry(3),
    };

    let encoded = encode(&request).expect("encode failed");
    let decoded: Request = decode(&encoded).expect("decode failed");

    assert_eq!(request, decoded);
}

#[test]
fn encode_decode_roundtrip_response() {
    let response = Response::Status {
        node_id: "node-1".to_string(),
        leader: true,
        uptime_secs: 3600,
        rules: 5,
        buckets: 2,
        scripts: 1,
        records: 40,
    };

    let encoded = encode(&response).expect("encode failed");
    let decoded: Response = decode(&encoded).expect("decode failed");

    assert_eq!(response, decoded);
}

#[test]
fn requests_are_tagged_by_type() {
    let encoded = encode(&Request::RemoveRule {
        rule_id: "disk".to_string(),
    })
    .expect("encode failed");

    let value: serde_json::Value = serde_json::from_slice(&encoded).expect("not json");

    assert_eq!(value, json!({"type": "RemoveRule", "rule_id": "disk"}));
}

#[test]
fn stash_alert_accepts_sink_payload() {
    let raw = json!({
        "type": "StashAlert",
        "alert": {
            "sink": "icinga",
            "alert": {"host_alias": "web-1", "service_description": "disk", "service_output": "critical"}
        }
    });

    let decoded: Request = decode(raw.to_string().as_bytes()).expect("decode failed");

    match decoded {
        Request::StashAlert {
            alert: Alert::Icinga(IcingaAlert { host_alias, .. }),
        } => assert_eq!(host_alias, "web-1"),
        other => panic!("unexpected request: {:?}", other),
    }
}

#[test]
fn encode_returns_json_without_length_prefix() {
    let encoded = encode(&Response::Ok).expect("encode failed");

    let json_str = std::str::from_utf8(&encoded).expect("should be valid UTF-8");
    assert!(
        json_str.starts_with('{'),
        "should be JSON object: {}",
        json_str
    );
}

#[test]
fn unknown_request_type_is_rejected() {
    let result: Result<Request, _> = decode(br#"{"type": "Reboot"}"#);

    assert!(matches!(result, Err(ProtocolError::Json(_))));
}

#[tokio::test]
async fn read_write_message_roundtrip() {
    let original = b"hello world";

    let mut buffer = Vec::new();
    write_message(&mut buffer, original)
        .await
        .expect("write failed");

    assert_eq!(buffer.len(), 4 + original.len());

    let mut cursor = std::io::Cursor::new(buffer);
    let read_back = read_message(&mut cursor).await.expect("read failed");

    assert_eq!(read_back, original);
}

#[tokio::test]
async fn write_message_adds_length_prefix() {
    let data = b"test data";

    let mut buffer = Vec::new();
    write_message(&mut buffer, data)
        .await
        .expect("write failed");

    let len = u32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]) as usize;
    assert_eq!(len, data.len());
    assert_eq!(&buffer[4..], data);
}

#[tokio::test]
async fn empty_stream_is_connection_closed() {
    let mut cursor = std::io::Cursor::new(Vec::<u8>::new());

    let result = read_message(&mut cursor).await;

    assert!(matches!(result, Err(ProtocolError::ConnectionClosed)));
}

#[tokio::test]
async fn oversized_length_prefix_is_rejected() {
    let mut buffer = ((MAX_MESSAGE_SIZE + 1) as u32).to_be_bytes().to_vec();
    buffer.extend_from_slice(b"{}");
    let mut cursor = std::io::Cursor::new(buffer);

    let result = read_message(&mut cursor).await;

    assert!(matches!(result, Err(ProtocolError::MessageTooLarge { .. })));
}
