// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Converters from monitoring-system alert payloads into events

use crate::event::Event;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Icinga notification payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcingaAlert {
    pub notification_type: String,
    pub service_description: String,
    pub host_alias: String,
    pub host_address: String,
    pub service_state: String,
    pub long_date_time: String,
    pub service_output: String,
    pub notification_author_name: String,
    pub notification_comment: String,
    pub host_display_name: String,
    pub service_display_name: String,
}

/// Site24x7 webhook payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Site247Alert {
    #[serde(rename = "MONITORNAME")]
    pub monitor_name: String,
    #[serde(rename = "MONITOR_GROUPNAME")]
    pub monitor_group_name: String,
    #[serde(rename = "SEARCH POLLFREQUENCY")]
    pub search_poll_frequency: i64,
    pub monitor_id: i64,
    pub failed_locations: String,
    #[serde(rename = "MONITORURL")]
    pub monitor_url: String,
    pub incident_time_iso: String,
    #[serde(rename = "MONITORTYPE")]
    pub monitor_type: String,
    pub status: String,
    pub timezone: String,
    pub incident_time: String,
    pub incident_reason: String,
    pub outage_time_unix_format: String,
    pub rca_link: String,
}

/// Azure activity-log alert payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AzureAlert {
    pub schema_id: String,
    pub data: AzureData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureData {
    #[serde(rename = "activated")]
    pub status: String,
    pub context: AzureContext,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureContext {
    #[serde(rename = "activityLog")]
    pub activity: AzureActivity,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AzureActivity {
    pub channels: String,
    pub correlation_id: String,
    pub event_source: String,
    pub event_timestamp: String,
    pub event_data_id: String,
    pub level: String,
    pub operation_name: String,
    pub operation_id: String,
    pub properties: AzureActivityProperties,
    pub resource_id: String,
    pub resource_group_name: String,
    pub resource_provider_name: String,
    pub status: String,
    pub subscription_id: String,
    pub submission_timestamp: String,
    pub resource_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AzureActivityProperties {
    pub title: String,
    pub details: String,
    pub current_health_status: String,
    pub previous_health_status: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub cause: String,
}

/// An alert from any supported monitoring system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sink", content = "alert", rename_all = "snake_case")]
pub enum Alert {
    Icinga(IcingaAlert),
    Site247(Site247Alert),
    Azure(AzureAlert),
}

impl Alert {
    pub fn source(&self) -> &'static str {
        match self {
            Alert::Icinga(_) => "icinga",
            Alert::Site247(_) => "site247",
            Alert::Azure(_) => "azure",
        }
    }

    pub fn event_type(&self) -> String {
        match self {
            Alert::Icinga(a) => format!(
                "icinga.{}.{}.{}",
                a.service_display_name, a.host_display_name, a.service_output
            ),
            Alert::Site247(a) => format!(
                "site247.{}.{}.{}",
                a.monitor_group_name, a.monitor_name, a.status
            ),
            Alert::Azure(a) => format!("azure.{}", a.data.context.activity.resource_id),
        }
    }

    /// Wrap the alert as an event with the given envelope identity
    pub fn into_event(self, event_id: impl Into<String>, now: DateTime<Utc>) -> Event {
        let event_type = self.event_type();
        let source = self.source();
        let data = match &self {
            Alert::Icinga(a) => serde_json::to_value(a),
            Alert::Site247(a) => serde_json::to_value(a),
            Alert::Azure(a) => serde_json::to_value(a),
        }
        .unwrap_or_default();

        let mut event = Event::new(event_type, source, data)
            .with_id(event_id)
            .with_time(now);
        event.content_type = "application/json".to_string();
        event.event_type_version = "1.0".to_string();
        event.cloud_events_version = "0.1".to_string();
        event
    }
}

#[cfg(test)]
#[path = "sinks_tests.rs"]
mod tests;
