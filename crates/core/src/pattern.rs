// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wildcard event-type patterns
//!
//! A pattern is a dot-delimited list of segments where each segment is either
//! `*` or a literal run without `.`. Every `*` (including one embedded in a
//! literal run such as `node*`) matches one or more characters and may span
//! segment boundaries, so `acme*` matches `acme.prod.search` but not `acme`.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static GRAMMAR: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^((\*|[^.]+)\.)*(\*|[^.]+)$"));

/// Errors from pattern compilation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("invalid pattern {pattern:?}: must be dot-separated segments of `*` or literal text")]
    Malformed { pattern: String },
    #[error("invalid pattern {pattern:?}: {message}")]
    Regex { pattern: String, message: String },
}

/// A compiled, anchored event-type pattern
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Validate and compile a rule pattern
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let grammar = GRAMMAR.as_ref().map_err(|e| PatternError::Regex {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        if !grammar.is_match(pattern) {
            return Err(PatternError::Malformed {
                pattern: pattern.to_string(),
            });
        }

        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("([^*]+)");

        let regex = Regex::new(&format!("^{}$", body)).map_err(|e| PatternError::Regex {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Check whether an event type matches this pattern
    pub fn matches(&self, event_type: &str) -> bool {
        self.regex.is_match(event_type)
    }

    /// The pattern as written in the rule
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The anchored regular expression the pattern compiled to
    pub fn regex_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::compile(&source).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "pattern_tests.rs"]
mod tests;
