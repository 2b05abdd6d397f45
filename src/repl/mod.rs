//! Replication-facing state used by resumable scans
//!
//! - `Timestamp`: logical oplog position
//! - `SpeculativeMajorityReadInfo`: highest position a speculative read observed
//! - `OperationContext`: per-operation owner of the above

mod speculative_read;
mod timestamp;

pub use speculative_read::{OperationContext, SpeculativeMajorityReadInfo};
pub use timestamp::Timestamp;
