// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP webhook sender

use super::{is_delivered, HookError, HookSender};
use async_trait::async_trait;
use std::time::Duration;

/// Base delay between attempts; doubles per attempt
const RETRY_BACKOFF: Duration = Duration::from_millis(200);
const MAX_BACKOFF: Duration = Duration::from_secs(5);

enum Attempt {
    Status(u16),
    Failed(String),
}

#[derive(Clone)]
pub struct HttpHookSender {
    agent: ureq::Agent,
    backoff: Duration,
}

impl HttpHookSender {
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            backoff: RETRY_BACKOFF,
        }
    }

    /// Override the base retry delay
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    async fn attempt(&self, url: &str, body: &[u8]) -> Attempt {
        let agent = self.agent.clone();
        let url = url.to_string();
        let body = body.to_vec();
        let result = tokio::task::spawn_blocking(move || {
            agent
                .post(&url)
                .header("Content-Type", "application/json")
                .send(&body[..])
        })
        .await;
        match result {
            Ok(Ok(response)) => Attempt::Status(response.status().as_u16()),
            Ok(Err(e)) => Attempt::Failed(e.to_string()),
            Err(e) => Attempt::Failed(e.to_string()),
        }
    }
}

#[async_trait]
impl HookSender for HttpHookSender {
    async fn post(
        &self,
        url: &str,
        payload: &serde_json::Value,
        max_retries: u32,
    ) -> Result<u16, HookError> {
        let body = serde_json::to_vec(payload)?;
        let attempts = max_retries.max(1);
        let mut delay = self.backoff;
        let mut n = 1;

        loop {
            let attempt = self.attempt(url, &body).await;
            match &attempt {
                Attempt::Status(status) if is_delivered(*status) => return Ok(*status),
                Attempt::Status(status) => {
                    tracing::debug!(url, attempt = n, status, "hook rejected")
                }
                Attempt::Failed(message) => {
                    tracing::debug!(url, attempt = n, error = %message, "hook unreachable")
                }
            }
            if n >= attempts {
                return Err(match attempt {
                    Attempt::Status(status) => HookError::Status {
                        url: url.to_string(),
                        status,
                        attempts,
                    },
                    Attempt::Failed(message) => HookError::Transport {
                        url: url.to_string(),
                        message,
                        attempts,
                    },
                });
            }
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(MAX_BACKOFF);
            n += 1;
        }
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
