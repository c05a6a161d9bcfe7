// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::hook::FakeHookSender;
use crate::script::FakeScriptEngine;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn new() -> Self {
        Self::default()
    }

    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::new();
    let logs_clone = logs.clone();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs_clone)
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

#[test]
fn traced_script_logs_span_and_outcome() {
    let (logs, outcome) = with_tracing(|| async {
        let fake = FakeScriptEngine::new();
        fake.set_outcome("s1", ScriptOutcome::Exception("boom".to_string()));
        let traced = TracedScriptEngine::new(fake);
        traced.execute(&Script::new("s1", ""), &json!({})).await
    });

    assert_eq!(outcome, ScriptOutcome::Exception("boom".to_string()));
    assert!(
        logs.contains("script.execute"),
        "Should log span name. Logs:\n{}",
        logs
    );
    assert!(logs.contains("s1"), "Should log script id. Logs:\n{}", logs);
    assert!(logs.contains("script raised"), "Logs:\n{}", logs);
    assert!(logs.contains("boom"), "Logs:\n{}", logs);
}

#[test]
fn traced_hook_logs_delivery() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedHookSender::new(FakeHookSender::new());
        traced.post("http://hooks/ok", &json!({}), 3).await
    });

    assert_eq!(result.unwrap(), 200);
    assert!(logs.contains("hook.post"), "Logs:\n{}", logs);
    assert!(logs.contains("http://hooks/ok"), "Logs:\n{}", logs);
    assert!(logs.contains("hook delivered"), "Logs:\n{}", logs);
    assert!(logs.contains("elapsed_ms"), "Logs:\n{}", logs);
}

#[test]
fn traced_hook_logs_failure() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeHookSender::new();
        fake.set_status("http://hooks/down", 503);
        let traced = TracedHookSender::new(fake.clone());
        let result = traced.post("http://hooks/down", &json!({}), 2).await;
        (result, fake.calls().len())
    });

    let (result, calls) = result;
    assert_eq!(result.unwrap_err().status_code(), 503);
    assert_eq!(calls, 1);
    assert!(logs.contains("hook failed"), "Logs:\n{}", logs);
    assert!(logs.contains("503"), "Logs:\n{}", logs);
}
