// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake script engine for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ScriptEngine, ScriptOutcome};
use async_trait::async_trait;
use cortex_core::Script;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Recorded script execution
#[derive(Debug, Clone)]
pub struct ScriptCall {
    pub script_id: String,
    pub input: serde_json::Value,
}

#[derive(Default)]
struct FakeScriptState {
    outcomes: HashMap<String, ScriptOutcome>,
    calls: Vec<ScriptCall>,
}

/// Fake engine returning preset outcomes per script ID (default `Nil`)
#[derive(Clone, Default)]
pub struct FakeScriptEngine {
    inner: Arc<Mutex<FakeScriptState>>,
}

impl FakeScriptEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_outcome(&self, script_id: &str, outcome: ScriptOutcome) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .outcomes
            .insert(script_id.to_string(), outcome);
    }

    pub fn calls(&self) -> Vec<ScriptCall> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .clone()
    }
}

#[async_trait]
impl ScriptEngine for FakeScriptEngine {
    async fn execute(&self, script: &Script, input: &serde_json::Value) -> ScriptOutcome {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.push(ScriptCall {
            script_id: script.id.clone(),
            input: input.clone(),
        });
        state
            .outcomes
            .get(&script.id)
            .cloned()
            .unwrap_or(ScriptOutcome::Nil)
    }
}
