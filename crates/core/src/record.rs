// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution history

use crate::bucket::Bucket;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of executing one flushed bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: String,
    pub bucket: Bucket,
    /// Script output, `None` when no script ran or it produced nothing usable
    #[serde(default)]
    pub script_result: Option<serde_json::Value>,
    /// HTTP status of the last hook attempt; 0 when no response was received
    #[serde(default)]
    pub hook_status_code: u16,
    pub created_at: DateTime<Utc>,
}

impl ExecutionRecord {
    pub fn rule_id(&self) -> &str {
        self.bucket.rule_id()
    }

    pub fn hook_succeeded(&self) -> bool {
        (200..300).contains(&self.hook_status_code)
    }
}
