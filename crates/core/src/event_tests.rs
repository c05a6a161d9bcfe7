// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;
use serde_json::json;

fn check_disk(event_id: &str) -> Event {
    Event {
        event_type: "acme.prod.icinga.check_disk".to_string(),
        event_type_version: "1.0".to_string(),
        cloud_events_version: "0.1".to_string(),
        source: "/sink".to_string(),
        event_id: event_id.to_string(),
        event_time: Some(Utc::now()),
        schema_url: "http://www.json.org".to_string(),
        content_type: "application/json".to_string(),
        data: json!({"alpha": "julie", "beta": 42}),
        extensions: BTreeMap::from([("ext1".to_string(), json!("value"))]),
        ..Event::default()
    }
}

#[test]
fn envelope_identity_does_not_affect_hash() {
    let a = check_disk("42");
    let b = check_disk("43").with_time(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());

    assert_eq!(a.hash(), b.hash());
    assert!(a.is_same_occurrence(&b));
}

#[test]
fn different_data_is_a_different_occurrence() {
    let a = check_disk("42");
    let mut b = check_disk("42");
    b.data = json!({"alpha": "julie", "beta": 43});

    assert_ne!(a.hash(), b.hash());
    assert!(!a.is_same_occurrence(&b));
}

#[test]
fn different_source_is_a_different_occurrence_even_with_equal_content() {
    let a = check_disk("42");
    let mut b = check_disk("42");
    b.source = "/other".to_string();

    assert!(!a.is_same_occurrence(&b));
}

#[test]
fn hash_is_memoized() {
    let event = check_disk("42");
    let first = event.hash();
    assert_eq!(event.hash(), first);
    assert_eq!(first.to_string().len(), 64);
}

#[test]
fn hash_survives_serde_roundtrip() {
    let event = check_disk("42");
    let json = serde_json::to_string(&event).unwrap();
    let back: Event = serde_json::from_str(&json).unwrap();

    assert_eq!(event, back);
    assert_eq!(event.hash(), back.hash());
}

#[test]
fn extension_changes_reset_cached_hash() {
    let event = check_disk("42");
    let before = event.hash();
    let event = event.with_extension("ext2", json!(true));
    assert_ne!(event.hash(), before);
}
