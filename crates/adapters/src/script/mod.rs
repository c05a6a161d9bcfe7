// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Script engines that transform flushed buckets

mod template;

pub use template::TemplateScriptEngine;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeScriptEngine, ScriptCall};

use async_trait::async_trait;
use cortex_core::Script;

/// Result of running a script
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptOutcome {
    /// The script produced a value
    Value(serde_json::Value),
    /// The script produced nothing
    Nil,
    /// The script raised an error
    Exception(String),
}

impl ScriptOutcome {
    /// The produced value, if any
    pub fn into_value(self) -> Option<serde_json::Value> {
        match self {
            ScriptOutcome::Value(v) => Some(v),
            ScriptOutcome::Nil | ScriptOutcome::Exception(_) => None,
        }
    }
}

/// Executes user scripts against a bucket's JSON form
#[async_trait]
pub trait ScriptEngine: Clone + Send + Sync + 'static {
    async fn execute(&self, script: &Script, input: &serde_json::Value) -> ScriptOutcome;
}
