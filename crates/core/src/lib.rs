// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cortex-core: data model for the event-correlation state machine
//!
//! This crate provides:
//! - Wildcard event-type patterns and correlation rules
//! - Events with content hashes for deduplication
//! - Dwell-window buckets
//! - The replicated command union
//! - Clock, ID and configuration plumbing

pub mod bucket;
pub mod clock;
pub mod command;
pub mod config;
pub mod event;
pub mod id;
pub mod pattern;
pub mod record;
pub mod rule;
pub mod script;
pub mod sinks;

pub use bucket::Bucket;
pub use clock::{elapsed_ms, Clock, FakeClock, SystemClock};
pub use command::Command;
pub use config::{Config, ConfigError, DwellDefaults};
pub use event::{ContentHash, Event};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use pattern::{Pattern, PatternError};
pub use record::ExecutionRecord;
pub use rule::Rule;
pub use script::Script;
pub use sinks::{Alert, AzureAlert, IcingaAlert, Site247Alert};
