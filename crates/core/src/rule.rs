// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Correlation rules

use crate::config::DwellDefaults;
use crate::pattern::{Pattern, PatternError};
use serde::{Deserialize, Serialize};

/// A correlation definition: which event types to group, how long to dwell,
/// how to transform the bucket and where to deliver it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub event_type_patterns: Vec<String>,
    /// Initial inactivity window in milliseconds
    #[serde(default)]
    pub dwell: u64,
    /// Events arriving later than this (ms) after the last update extend the window
    #[serde(default)]
    pub dwell_deadline: u64,
    /// Bucket age (ms) after which the window stops growing
    #[serde(default)]
    pub max_dwell: u64,
    #[serde(default)]
    pub script_id: Option<String>,
    pub hook_endpoint: String,
    #[serde(default)]
    pub hook_retry: u32,
    #[serde(default)]
    pub disabled: bool,
    #[serde(skip)]
    compiled: Vec<Pattern>,
}

impl Rule {
    pub fn new(
        id: impl Into<String>,
        patterns: impl IntoIterator<Item = impl Into<String>>,
        hook_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            event_type_patterns: patterns.into_iter().map(Into::into).collect(),
            hook_endpoint: hook_endpoint.into(),
            ..Self::default()
        }
    }

    pub fn with_dwell(mut self, dwell: u64, dwell_deadline: u64, max_dwell: u64) -> Self {
        self.dwell = dwell;
        self.dwell_deadline = dwell_deadline;
        self.max_dwell = max_dwell;
        self
    }

    pub fn with_script(mut self, script_id: impl Into<String>) -> Self {
        self.script_id = Some(script_id.into());
        self
    }

    pub fn with_hook_retry(mut self, hook_retry: u32) -> Self {
        self.hook_retry = hook_retry;
        self
    }

    /// Substitute cluster-wide defaults for any dwell parameter left at zero
    pub fn apply_defaults(&mut self, defaults: &DwellDefaults) {
        if self.dwell == 0 {
            self.dwell = defaults.dwell;
        }
        if self.dwell_deadline == 0 {
            self.dwell_deadline = defaults.dwell_deadline;
        }
        if self.max_dwell == 0 {
            self.max_dwell = defaults.max_dwell;
        }
    }

    /// Compile every pattern, replacing any previous compilation.
    ///
    /// Fails on the first malformed pattern and leaves the rule uncompiled.
    pub fn validate(&mut self) -> Result<(), PatternError> {
        self.compiled.clear();
        let compiled = self
            .event_type_patterns
            .iter()
            .map(|p| Pattern::compile(p))
            .collect::<Result<Vec<_>, _>>()?;
        self.compiled = compiled;
        Ok(())
    }

    /// Whether `validate` has compiled the current patterns
    pub fn is_compiled(&self) -> bool {
        self.compiled.len() == self.event_type_patterns.len()
            && self
                .compiled
                .iter()
                .zip(&self.event_type_patterns)
                .all(|(c, p)| c.as_str() == p)
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.compiled
    }

    /// A disabled rule never matches
    pub fn has_matching(&self, event_type: &str) -> bool {
        if self.disabled {
            return false;
        }
        self.compiled.iter().any(|p| p.matches(event_type))
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.event_type_patterns == other.event_type_patterns
            && self.dwell == other.dwell
            && self.dwell_deadline == other.dwell_deadline
            && self.max_dwell == other.max_dwell
            && self.script_id == other.script_id
            && self.hook_endpoint == other.hook_endpoint
            && self.hook_retry == other.hook_retry
            && self.disabled == other.disabled
    }
}

impl Eq for Rule {}

#[cfg(test)]
#[path = "rule_tests.rs"]
mod tests;
