//! Speculative Majority Reads
//!
//! A speculative majority read returns data before it is known to be majority
//! committed. Durability is confirmed afterwards by waiting until the highest
//! oplog position the read observed has been majority committed.
//!
//! This module tracks that position for one operation:
//! - The read is flagged speculative once, before execution starts
//! - The observed position only ever moves forward
//! - Null timestamps are never recorded

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use super::timestamp::Timestamp;

/// Per-operation record of the highest timestamp a speculative read observed.
///
/// Interior mutability lets the executor advance the timestamp through a
/// shared `OperationContext`. Only one thread drives an operation at a time.
#[derive(Debug, Default)]
pub struct SpeculativeMajorityReadInfo {
    /// Whether the current operation is a speculative majority read
    is_speculative: AtomicBool,
    /// Highest timestamp observed so far, 0 if none
    read_timestamp: AtomicU64,
}

impl SpeculativeMajorityReadInfo {
    /// Creates tracking state for a non-speculative read.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flags the operation as a speculative majority read.
    pub fn set_is_speculative_read(&self) {
        self.is_speculative.store(true, Ordering::Release);
    }

    /// Returns true if the operation is a speculative majority read.
    pub fn is_speculative_read(&self) -> bool {
        self.is_speculative.load(Ordering::Acquire)
    }

    /// Advances the speculative read timestamp to `ts` if it is higher than
    /// the current value. Lower or equal values are ignored.
    pub fn set_speculative_read_timestamp_forward(&self, ts: Timestamp) {
        if ts.is_null() {
            return;
        }
        self.read_timestamp.fetch_max(ts.value(), Ordering::AcqRel);
    }

    /// Returns the highest timestamp recorded, if any.
    pub fn speculative_read_timestamp(&self) -> Option<Timestamp> {
        match self.read_timestamp.load(Ordering::Acquire) {
            0 => None,
            value => Some(Timestamp::new(value)),
        }
    }
}

/// State scoped to a single client operation.
///
/// Handed to the executor explicitly rather than looked up from a global.
#[derive(Debug, Default)]
pub struct OperationContext {
    speculative_read_info: SpeculativeMajorityReadInfo,
}

impl OperationContext {
    /// Creates a context for a regular (non-speculative) read.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context for a speculative majority read.
    pub fn speculative() -> Self {
        let ctx = Self::default();
        ctx.speculative_read_info.set_is_speculative_read();
        ctx
    }

    /// Returns the speculative read tracker for this operation.
    pub fn speculative_read_info(&self) -> &SpeculativeMajorityReadInfo {
        &self.speculative_read_info
    }
}
