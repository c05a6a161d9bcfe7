// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Cluster-wide dwell parameters substituted into rules that leave them at zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DwellDefaults {
    pub dwell: u64,
    pub dwell_deadline: u64,
    pub max_dwell: u64,
}

impl Default for DwellDefaults {
    fn default() -> Self {
        Self {
            dwell: 3 * 60 * 1000,
            dwell_deadline: 150 * 1000,
            max_dwell: 6 * 60 * 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub node_id: String,
    pub data_dir: PathBuf,
    /// Defaults to `<data_dir>/cortexd.sock`
    pub socket_path: Option<PathBuf>,
    #[serde(with = "humantime_serde")]
    pub flush_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub hook_timeout: Duration,
    /// Milliseconds
    pub dwell: u64,
    /// Milliseconds
    pub dwell_deadline: u64,
    /// Milliseconds
    pub max_dwell: u64,
    pub max_history: usize,
    pub queue_capacity: usize,
    /// Commands applied between automatic snapshots; 0 disables them
    pub snapshot_threshold: u64,
    /// Log payloads instead of posting them
    pub disable_post_hook: bool,
}

impl Default for Config {
    fn default() -> Self {
        let dwell = DwellDefaults::default();
        Self {
            node_id: String::new(),
            data_dir: PathBuf::from("/var/lib/cortex"),
            socket_path: None,
            flush_interval: Duration::from_secs(1),
            hook_timeout: Duration::from_secs(10),
            dwell: dwell.dwell,
            dwell_deadline: dwell.dwell_deadline,
            max_dwell: dwell.max_dwell,
            max_history: 1000,
            queue_capacity: 100,
            snapshot_threshold: 1000,
            disable_post_hook: false,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), node_id = %config.node_id, "loaded config");
        Ok(config)
    }

    /// Parse and validate TOML content
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));
        if self.node_id.trim().is_empty() {
            return invalid("node_id must not be empty");
        }
        if self.flush_interval.is_zero() {
            return invalid("flush_interval must be positive");
        }
        if self.hook_timeout.is_zero() {
            return invalid("hook_timeout must be positive");
        }
        if self.dwell == 0 || self.dwell_deadline == 0 || self.max_dwell == 0 {
            return invalid("dwell, dwell_deadline and max_dwell must be positive");
        }
        if self.max_dwell < self.dwell {
            return invalid("max_dwell must not be shorter than dwell");
        }
        if self.max_history == 0 {
            return invalid("max_history must be positive");
        }
        if self.queue_capacity == 0 {
            return invalid("queue_capacity must be positive");
        }
        Ok(())
    }

    pub fn dwell_defaults(&self) -> DwellDefaults {
        DwellDefaults {
            dwell: self.dwell,
            dwell_deadline: self.dwell_deadline,
            max_dwell: self.max_dwell,
        }
    }

    pub fn socket_path(&self) -> PathBuf {
        self.socket_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("cortexd.sock"))
    }

    pub fn lock_path(&self) -> PathBuf {
        self.data_dir.join("cortexd.pid")
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("cortexd.log")
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
