// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Template-based script engine
//!
//! Scripts are minijinja templates rendered with the bucket bound to
//! `bucket`. Output that parses as JSON becomes that value, other non-empty
//! output becomes a string, and empty output (or `null`) means no result.

use super::{ScriptEngine, ScriptOutcome};
use async_trait::async_trait;
use cortex_core::Script;
use minijinja::{context, Environment, UndefinedBehavior};
use std::sync::Arc;

#[derive(Clone)]
pub struct TemplateScriptEngine {
    env: Arc<Environment<'static>>,
}

impl Default for TemplateScriptEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateScriptEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        Self { env: Arc::new(env) }
    }

    fn render(&self, script: &Script, input: &serde_json::Value) -> ScriptOutcome {
        let source = script.source();
        let output = match self.env.render_str(&source, context! { bucket => input }) {
            Ok(output) => output,
            Err(e) => return ScriptOutcome::Exception(e.to_string()),
        };
        let trimmed = output.trim();
        if trimmed.is_empty() {
            return ScriptOutcome::Nil;
        }
        match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(serde_json::Value::Null) => ScriptOutcome::Nil,
            Ok(value) => ScriptOutcome::Value(value),
            Err(_) => ScriptOutcome::Value(serde_json::Value::String(trimmed.to_string())),
        }
    }
}

#[async_trait]
impl ScriptEngine for TemplateScriptEngine {
    async fn execute(&self, script: &Script, input: &serde_json::Value) -> ScriptOutcome {
        self.render(script, input)
    }
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
