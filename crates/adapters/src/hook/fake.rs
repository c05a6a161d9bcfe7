// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake hook sender for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{is_delivered, HookError, HookSender};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Recorded hook post
#[derive(Debug, Clone)]
pub struct HookCall {
    pub url: String,
    pub payload: serde_json::Value,
    pub max_retries: u32,
}

#[derive(Default)]
struct FakeHookState {
    statuses: HashMap<String, u16>,
    calls: Vec<HookCall>,
}

/// Fake sender answering with a preset status per URL (default 200)
#[derive(Clone, Default)]
pub struct FakeHookSender {
    inner: Arc<Mutex<FakeHookState>>,
}

impl FakeHookSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&self, url: &str, status: u16) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .statuses
            .insert(url.to_string(), status);
    }

    pub fn calls(&self) -> Vec<HookCall> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .clone()
    }
}

#[async_trait]
impl HookSender for FakeHookSender {
    async fn post(
        &self,
        url: &str,
        payload: &serde_json::Value,
        max_retries: u32,
    ) -> Result<u16, HookError> {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.push(HookCall {
            url: url.to_string(),
            payload: payload.clone(),
            max_retries,
        });
        let status = state.statuses.get(url).copied().unwrap_or(200);
        if is_delivered(status) {
            Ok(status)
        } else {
            Err(HookError::Status {
                url: url.to_string(),
                status,
                attempts: max_retries.max(1),
            })
        }
    }
}
