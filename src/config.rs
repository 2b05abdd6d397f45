//! Executor Configuration
//!
//! Options are fixed when the executor is built:
//! - Which resumable scan discipline applies (if any)
//! - Whether output will be merged by a downstream node
//! - The resume token a change stream starts from

use serde::Deserialize;
use serde_json::Value;

use crate::exec::{ExecutorError, ExecutorResult, ResumableScanType};

/// Configuration for a pipeline executor.
///
/// Deserializable so it can be carried inside a request or a config file;
/// every field has a default.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExecutorOptions {
    /// Resumable scan discipline. Fixed for the executor's lifetime.
    pub resumable_scan_type: ResumableScanType,

    /// Whether output is consumed by a merging node.
    ///
    /// When set, documents are serialized with metadata and the change
    /// stream `_id` check is left to the merging node.
    pub needs_merge: bool,

    /// Resume token a change stream starts from.
    ///
    /// Required for change streams, ignored otherwise.
    pub initial_post_batch_resume_token: Option<Value>,
}

impl ExecutorOptions {
    /// Options for a plain, non-resumable scan.
    pub fn non_resumable() -> Self {
        Self::default()
    }

    /// Options for a change stream starting at `initial_token`.
    pub fn change_stream(initial_token: Value) -> Self {
        Self {
            resumable_scan_type: ResumableScanType::ChangeStream,
            initial_post_batch_resume_token: Some(initial_token),
            ..Self::default()
        }
    }

    /// Options for a resumable oplog scan.
    pub fn oplog_scan() -> Self {
        Self {
            resumable_scan_type: ResumableScanType::OplogScan,
            ..Self::default()
        }
    }

    /// Marks output as merge-bound, builder style.
    pub fn with_needs_merge(mut self, needs_merge: bool) -> Self {
        self.needs_merge = needs_merge;
        self
    }

    /// Validate the configuration.
    ///
    /// - Change streams require a non-empty initial resume token
    /// - An initial token, when present, must be an object
    pub fn validate(&self) -> ExecutorResult<()> {
        if let Some(token) = &self.initial_post_batch_resume_token {
            if !token.is_object() {
                return Err(ExecutorError::invariant_violation(
                    "initial post-batch resume token must be an object",
                ));
            }
        }

        if self.resumable_scan_type == ResumableScanType::ChangeStream {
            let has_token = self
                .initial_post_batch_resume_token
                .as_ref()
                .and_then(Value::as_object)
                .is_some_and(|token| !token.is_empty());
            if !has_token {
                return Err(ExecutorError::invariant_violation(
                    "expected initial post-batch resume token to be not empty",
                ));
            }
        }

        Ok(())
    }
}
