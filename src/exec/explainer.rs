//! Execution statistics for explain output

use serde::Serialize;
use serde_json::Value;

use super::state::ResumableScanType;

/// Per-executor statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanExplainer {
    /// Documents returned to the caller
    n_returned: u64,
    /// Resumable scan discipline
    resumable_scan_type: ResumableScanType,
    /// Whether output is merge-bound
    needs_merge: bool,
}

impl PlanExplainer {
    /// Creates an explainer with no documents returned.
    pub fn new(resumable_scan_type: ResumableScanType, needs_merge: bool) -> Self {
        Self {
            n_returned: 0,
            resumable_scan_type,
            needs_merge,
        }
    }

    /// Counts one returned document.
    pub fn increment_n_returned(&mut self) {
        self.n_returned += 1;
    }

    /// Returns the number of documents returned.
    pub fn n_returned(&self) -> u64 {
        self.n_returned
    }

    /// Renders the statistics as a JSON summary.
    pub fn explain(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
