// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Replicated commands
//!
//! Every mutation of correlation state is expressed as a [`Command`]. The
//! log totally orders commands and each replica applies them in that order.
//! Anything time-dependent is stamped into the command by the submitter, so
//! applying a command never reads a local clock.

use crate::event::Event;
use crate::record::ExecutionRecord;
use crate::rule::Rule;
use crate::script::Script;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// `at` is the leader's clock when the event was accepted
    Stash {
        rule_id: String,
        event: Event,
        at: DateTime<Utc>,
    },
    AddRule { rule: Rule },
    UpdateRule { rule: Rule },
    RemoveRule { rule_id: String },
    FlushBucket { rule_id: String },
    AddScript { script: Script },
    UpdateScript { script: Script },
    RemoveScript { script_id: String },
    AddRecord { record: Box<ExecutionRecord> },
    RemoveRecord { record_id: String },
}

impl Command {
    /// Short operation name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Command::Stash { .. } => "stash",
            Command::AddRule { .. } => "add_rule",
            Command::UpdateRule { .. } => "update_rule",
            Command::RemoveRule { .. } => "remove_rule",
            Command::FlushBucket { .. } => "flush_bucket",
            Command::AddScript { .. } => "add_script",
            Command::UpdateScript { .. } => "update_script",
            Command::RemoveScript { .. } => "remove_script",
            Command::AddRecord { .. } => "add_record",
            Command::RemoveRecord { .. } => "remove_record",
        }
    }

    /// Encode as a log entry
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a log entry produced by [`Command::encode`]
    pub fn decode(entry: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(entry)
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
