// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use cortex_core::PatternError;
use cortex_storage::{LogError, StoreError};
use thiserror::Error;

/// Errors surfaced by the node facade
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("not leader")]
    NotLeader,
    #[error("invalid rule: {0}")]
    InvalidRule(#[from] PatternError),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Store(StoreError),
    #[error(transparent)]
    Log(LogError),
}

impl From<LogError> for NodeError {
    fn from(e: LogError) -> Self {
        match e {
            LogError::NotLeader => NodeError::NotLeader,
            LogError::Store(StoreError::InvalidPattern(p)) => NodeError::InvalidRule(p),
            LogError::Store(s) => NodeError::Store(s),
            other => NodeError::Log(other),
        }
    }
}

/// Errors from executing a flushed bucket
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("failed to encode bucket: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to record execution: {0}")]
    Record(#[from] LogError),
}
