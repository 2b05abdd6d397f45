//! Executor metrics
//!
//! - Counters only
//! - Monotonic increase
//! - Thread-safe but lock-minimal, so a host can read them while a cursor runs

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for pipeline executors.
///
/// One registry may be shared by many executors through an `Arc`.
/// Uses Relaxed ordering; counters are exact but not synchronized with
/// each other.
#[derive(Debug, Default)]
pub struct ExecutorMetrics {
    /// Documents handed to callers (fresh and redelivered)
    documents_returned: AtomicU64,
    /// Documents redelivered from the pushback stash
    stash_redeliveries: AtomicU64,
    /// Topology change events materialized as documents
    topology_changes: AtomicU64,
    /// Times a change stream advanced to a high-water mark
    high_water_mark_advances: AtomicU64,
    /// Change stream events rejected for a modified `_id`
    resume_token_validation_failures: AtomicU64,
    /// Executors marked as killed
    kills: AtomicU64,
}

impl ExecutorMetrics {
    /// Create a new registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment documents returned
    pub fn increment_documents_returned(&self) {
        self.documents_returned.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment stash redeliveries
    pub fn increment_stash_redeliveries(&self) {
        self.stash_redeliveries.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment topology changes
    pub fn increment_topology_changes(&self) {
        self.topology_changes.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment high-water-mark advances
    pub fn increment_high_water_mark_advances(&self) {
        self.high_water_mark_advances.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment resume token validation failures
    pub fn increment_resume_token_validation_failures(&self) {
        self.resume_token_validation_failures
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Increment kills
    pub fn increment_kills(&self) {
        self.kills.fetch_add(1, Ordering::Relaxed);
    }

    /// Get documents returned
    pub fn documents_returned(&self) -> u64 {
        self.documents_returned.load(Ordering::Relaxed)
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_returned: self.documents_returned.load(Ordering::Relaxed),
            stash_redeliveries: self.stash_redeliveries.load(Ordering::Relaxed),
            topology_changes: self.topology_changes.load(Ordering::Relaxed),
            high_water_mark_advances: self.high_water_mark_advances.load(Ordering::Relaxed),
            resume_token_validation_failures: self
                .resume_token_validation_failures
                .load(Ordering::Relaxed),
            kills: self.kills.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub documents_returned: u64,
    pub stash_redeliveries: u64,
    pub topology_changes: u64,
    pub high_water_mark_advances: u64,
    pub resume_token_validation_failures: u64,
    pub kills: u64,
}
