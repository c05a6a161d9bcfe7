// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for script execution and webhook delivery

pub mod hook;
pub mod script;
pub mod traced;

pub use hook::{is_delivered, HookError, HookSender, HttpHookSender};
pub use script::{ScriptEngine, ScriptOutcome, TemplateScriptEngine};
pub use traced::{TracedHookSender, TracedScriptEngine};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use hook::{FakeHookSender, HookCall};
#[cfg(any(test, feature = "test-support"))]
pub use script::{FakeScriptEngine, ScriptCall};
