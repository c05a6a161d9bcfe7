// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Storage maps, command application and the replicated log

mod log;
mod snapshot;
mod state;
mod table;
mod wal;

pub use log::{LocalLog, LogError, ReplicatedLog, SNAPSHOT_FILE, WAL_FILE};
pub use snapshot::{FrameType, SnapshotError, SnapshotSource};
pub use state::{Applied, CommandApplier, StateMachine, Store};
pub use table::{Keyed, Stashed, StoreError, Table};
pub use wal::{Wal, WalError};
