// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Cortex daemon: lifecycle, socket server and wire protocol

pub mod lifecycle;
pub mod protocol;
pub mod server;
