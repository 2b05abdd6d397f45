//! Timestamp - Totally ordered oplog position
//!
//! An oplog timestamp identifies a position in the replication log:
//! - Totally orders all oplog entries
//! - Independent of wall-clock time
//! - Zero is reserved as the null timestamp (no position observed)

use std::fmt;

use serde::{Deserialize, Serialize};

/// A totally ordered logical position in the oplog.
///
/// Resume positions handed to clients are derived from this value, so every
/// comparison that decides whether a resume position may advance is made on
/// `Timestamp`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The null timestamp. Sorts before every real oplog position.
    pub const NULL: Timestamp = Timestamp(0);

    /// Creates a timestamp with the given value.
    #[inline]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying value.
    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Returns true for the null timestamp.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}
