// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Incoming events and their content hash

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// SHA-256 digest over the semantically meaningful fields of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// A typed occurrence submitted for correlation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Event {
    /// Dot-delimited hierarchical type, e.g. `acme.prod.icinga.check_disk`
    pub event_type: String,
    #[serde(default)]
    pub event_type_version: String,
    #[serde(default)]
    pub cloud_events_version: String,
    pub source: String,
    #[serde(default)]
    pub event_id: String,
    pub event_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub schema_url: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub extensions: BTreeMap<String, serde_json::Value>,
    #[serde(skip)]
    hash: OnceLock<ContentHash>,
}

/// The fields that participate in the content hash. Envelope identity
/// (`event_id`, `event_time`) is left out so redeliveries hash identically.
#[derive(Serialize)]
struct HashedFields<'a> {
    cloud_events_version: &'a str,
    content_type: &'a str,
    data: &'a serde_json::Value,
    event_type: &'a str,
    event_type_version: &'a str,
    extensions: &'a BTreeMap<String, serde_json::Value>,
    schema_url: &'a str,
    source: &'a str,
}

impl Event {
    pub fn new(
        event_type: impl Into<String>,
        source: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            source: source.into(),
            data,
            ..Self::default()
        }
    }

    pub fn with_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = event_id.into();
        self
    }

    pub fn with_time(mut self, event_time: DateTime<Utc>) -> Self {
        self.event_time = Some(event_time);
        self
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extensions.insert(key.into(), value);
        self.hash = OnceLock::new();
        self
    }

    /// Content hash, computed on first use and cached on this instance
    pub fn hash(&self) -> ContentHash {
        *self.hash.get_or_init(|| {
            let fields = HashedFields {
                cloud_events_version: &self.cloud_events_version,
                content_type: &self.content_type,
                data: &self.data,
                event_type: &self.event_type,
                event_type_version: &self.event_type_version,
                extensions: &self.extensions,
                schema_url: &self.schema_url,
                source: &self.source,
            };
            // serde_json maps are ordered, so the encoding is canonical
            let bytes = serde_json::to_vec(&fields).unwrap_or_default();
            ContentHash(Sha256::digest(&bytes).into())
        })
    }

    /// Two deliveries are the same occurrence when source and content hash agree
    pub fn is_same_occurrence(&self, other: &Event) -> bool {
        self.source == other.source && self.hash() == other.hash()
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.event_type == other.event_type
            && self.event_type_version == other.event_type_version
            && self.cloud_events_version == other.cloud_events_version
            && self.source == other.source
            && self.event_id == other.event_id
            && self.event_time == other.event_time
            && self.schema_url == other.schema_url
            && self.content_type == other.content_type
            && self.data == other.data
            && self.extensions == other.extensions
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
