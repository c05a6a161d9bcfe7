// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

fn icinga() -> IcingaAlert {
    IcingaAlert {
        host_alias: "hostname-alias".to_string(),
        host_address: "1.2.3.4".to_string(),
        service_state: "CRITICAL".to_string(),
        service_output: "connection refused".to_string(),
        service_display_name: "servicename-26378".to_string(),
        service_description: "servicename-26378".to_string(),
        host_display_name: "hostname".to_string(),
        notification_type: "PROBLEM".to_string(),
        ..IcingaAlert::default()
    }
}

#[test]
fn icinga_event_type_and_data() {
    let now = Utc::now();
    let event = Alert::Icinga(icinga()).into_event("ev-1", now);

    assert_eq!(
        event.event_type,
        "icinga.servicename-26378.hostname.connection refused"
    );
    assert_eq!(event.source, "icinga");
    assert_eq!(event.event_id, "ev-1");
    assert_eq!(event.event_time, Some(now));
    assert_eq!(event.content_type, "application/json");
    assert_eq!(event.data["host_address"], "1.2.3.4");
}

#[test]
fn site247_parses_wire_names() {
    let alert: Site247Alert = serde_json::from_value(json!({
        "MONITORNAME": "cart",
        "MONITOR_GROUPNAME": "checkout",
        "STATUS": "DOWN",
        "MONITOR_ID": 42,
        "INCIDENT_REASON": "timeout"
    }))
    .unwrap();

    assert_eq!(alert.monitor_id, 42);
    assert_eq!(alert.incident_reason, "timeout");

    let event = Alert::Site247(alert).into_event("ev-2", Utc::now());
    assert_eq!(event.event_type, "site247.checkout.cart.DOWN");
    assert_eq!(event.data["MONITORNAME"], "cart");
}

#[test]
fn azure_uses_resource_id() {
    let alert: AzureAlert = serde_json::from_value(json!({
        "schemaId": "Microsoft.Insights/activityLogs",
        "data": {
            "activated": "Activated",
            "context": {
                "activityLog": {
                    "resourceId": "vm-1",
                    "properties": { "type": "Incident", "title": "degraded" }
                }
            }
        }
    }))
    .unwrap();

    assert_eq!(alert.data.context.activity.properties.kind, "Incident");
    let event = Alert::Azure(alert).into_event("ev-3", Utc::now());
    assert_eq!(event.event_type, "azure.vm-1");
    assert_eq!(event.source, "azure");
}

#[test]
fn redelivered_alert_is_same_occurrence() {
    let a = Alert::Icinga(icinga()).into_event("ev-1", Utc::now());
    let b = Alert::Icinga(icinga()).into_event("ev-2", Utc::now());

    assert!(a.is_same_occurrence(&b));
}

#[test]
fn alert_envelope_is_tagged() {
    let alert: Alert = serde_json::from_value(json!({
        "sink": "icinga",
        "alert": { "host_display_name": "h", "service_display_name": "s", "service_output": "o" }
    }))
    .unwrap();

    assert_eq!(alert.event_type(), "icinga.s.h.o");
}
