//! Expression context
//!
//! Per-query state the executor reads but never changes: whether output is
//! merge-bound, the change stream's starting token, and the operation the
//! query runs under.

use std::sync::Arc;

use serde_json::Value;

use crate::config::ExecutorOptions;
use crate::repl::OperationContext;

/// Query-wide context shared by the executor and its pipeline
#[derive(Debug, Clone)]
pub struct ExpressionContext {
    /// Output will be merged by a downstream node
    pub needs_merge: bool,

    /// Resume token a change stream starts from
    pub initial_post_batch_resume_token: Option<Value>,

    /// Operation this query runs under
    pub op_ctx: Arc<OperationContext>,
}

impl ExpressionContext {
    /// Creates a context for a non-merging query with no initial token.
    pub fn new(op_ctx: Arc<OperationContext>) -> Self {
        Self {
            needs_merge: false,
            initial_post_batch_resume_token: None,
            op_ctx,
        }
    }

    /// Creates a context from executor options.
    pub fn from_options(options: &ExecutorOptions, op_ctx: Arc<OperationContext>) -> Self {
        Self {
            needs_merge: options.needs_merge,
            initial_post_batch_resume_token: options.initial_post_batch_resume_token.clone(),
            op_ctx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_options() {
        let options = ExecutorOptions::change_stream(json!({"_data": {}})).with_needs_merge(true);
        let ctx = ExpressionContext::from_options(&options, Arc::new(OperationContext::new()));

        assert!(ctx.needs_merge);
        assert_eq!(ctx.initial_post_batch_resume_token, Some(json!({"_data": {}})));
    }
}
