// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::hook::{HookError, HookSender};
use crate::script::{ScriptEngine, ScriptOutcome};
use async_trait::async_trait;
use cortex_core::Script;
use tracing::Instrument;

/// Wrapper that adds tracing to any ScriptEngine
#[derive(Clone)]
pub struct TracedScriptEngine<S> {
    inner: S,
}

impl<S> TracedScriptEngine<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: ScriptEngine> ScriptEngine for TracedScriptEngine<S> {
    async fn execute(&self, script: &Script, input: &serde_json::Value) -> ScriptOutcome {
        let span = tracing::info_span!("script.execute", script_id = %script.id);
        async {
            let start = std::time::Instant::now();
            let outcome = self.inner.execute(script, input).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &outcome {
                ScriptOutcome::Value(_) => tracing::info!(elapsed_ms, "script produced value"),
                ScriptOutcome::Nil => tracing::info!(elapsed_ms, "script produced nothing"),
                ScriptOutcome::Exception(message) => {
                    tracing::warn!(elapsed_ms, error = %message, "script raised")
                }
            }

            outcome
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any HookSender
#[derive(Clone)]
pub struct TracedHookSender<H> {
    inner: H,
}

impl<H> TracedHookSender<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<H: HookSender> HookSender for TracedHookSender<H> {
    async fn post(
        &self,
        url: &str,
        payload: &serde_json::Value,
        max_retries: u32,
    ) -> Result<u16, HookError> {
        let span = tracing::info_span!("hook.post", url, max_retries);
        async {
            let start = std::time::Instant::now();
            let result = self.inner.post(url, payload, max_retries).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(status) => tracing::info!(status, elapsed_ms, "hook delivered"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "hook failed"),
            }

            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
