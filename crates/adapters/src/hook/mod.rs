// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Webhook delivery

mod http;

pub use http::HttpHookSender;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeHookSender, HookCall};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from hook delivery
#[derive(Debug, Error)]
pub enum HookError {
    #[error("hook {url} answered {status} after {attempts} attempts")]
    Status {
        url: String,
        status: u16,
        attempts: u32,
    },
    #[error("hook {url} unreachable after {attempts} attempts: {message}")]
    Transport {
        url: String,
        message: String,
        attempts: u32,
    },
    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}

impl HookError {
    /// Status code to record; 0 when no response was received
    pub fn status_code(&self) -> u16 {
        match self {
            HookError::Status { status, .. } => *status,
            HookError::Transport { .. } | HookError::Encode(_) => 0,
        }
    }
}

/// Whether a hook response counts as delivered
pub fn is_delivered(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Posts JSON payloads to webhook endpoints
#[async_trait]
pub trait HookSender: Clone + Send + Sync + 'static {
    /// Post `payload` to `url`, making up to `max_retries` attempts (at least
    /// one). Returns the delivered status code.
    async fn post(
        &self,
        url: &str,
        payload: &serde_json::Value,
        max_retries: u32,
    ) -> Result<u16, HookError>;
}
