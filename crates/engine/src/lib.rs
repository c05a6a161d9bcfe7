// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Cortex correlation engine: node facade, flush scheduler and executor

mod error;
mod executor;
mod node;
mod runtime;
mod scheduler;

pub use error::{ExecuteError, NodeError};
pub use executor::Executor;
pub use node::Node;
pub use runtime::{Runtime, RuntimeConfig, RuntimeDeps};
pub use scheduler::FlushScheduler;
