//! Executor states and selectors

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result state of a retrieval call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecState {
    /// A result was produced
    Advanced,
    /// The stream is exhausted
    IsEof,
}

/// What a `get_next` call wants back alongside its state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputRequest {
    /// Return the document as a raw object
    Object,
    /// Only report the state; the document is consumed but not returned
    StateOnly,
    /// Return the object and its record id. Pipeline executors do not track
    /// record ids, so this is always rejected.
    ObjectAndRecordId,
}

/// Resumable scan discipline. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResumableScanType {
    /// Not resumable
    #[default]
    None,
    /// Change stream over change events
    ChangeStream,
    /// Scan of the oplog itself
    OplogScan,
}

impl fmt::Display for ResumableScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResumableScanType::None => write!(f, "none"),
            ResumableScanType::ChangeStream => write!(f, "changeStream"),
            ResumableScanType::OplogScan => write!(f, "oplogScan"),
        }
    }
}
