//! Change stream `_id` check
//!
//! A change event's `_id` is its resume token. The same token is carried in
//! the event's sort key metadata, which stages cannot touch. If a stage
//! rewrote `_id`, a client resuming from it would land in the wrong place, so
//! every event is checked before it leaves the executor.

use serde_json::{json, Value};
use tracing::warn;

use crate::document::Document;

use super::errors::{ExecutorError, ExecutorResult};

/// Checks that change stream events still carry their original `_id`.
#[derive(Debug, Clone, Copy)]
pub struct ChangeStreamIdValidator {
    needs_merge: bool,
}

impl ChangeStreamIdValidator {
    /// Creates a validator. When `needs_merge` is set the merging node
    /// performs the check after its own stages run, and this one is a no-op.
    pub fn new(needs_merge: bool) -> Self {
        Self { needs_merge }
    }

    /// Validates one event.
    pub fn validate(&self, event: &Document) -> ExecutorResult<()> {
        if self.needs_merge {
            return Ok(());
        }

        let resume_token = event.metadata().sort_key().ok_or_else(|| {
            ExecutorError::invariant_violation("change stream event has no sort key")
        })?;
        let id_field = event.get("_id");

        let unchanged =
            resume_token.is_object() && id_field.is_some_and(|id| binary_equal(id, resume_token));
        if unchanged {
            return Ok(());
        }

        let found = match id_field {
            Some(id) => json!({ "_id": id }),
            None => json!({}),
        };
        warn!(expected = %resume_token, found = %found, "change stream event _id was modified");

        Err(ExecutorError::change_stream_fatal(format!(
            "Change event _id was altered by the pipeline. The _id holds the event's resume \
             token, so a stream cannot be resumed from an event whose _id has changed; only \
             stages that leave _id untouched are permitted. Expected: {} but found: {}",
            json!({ "_id": resume_token }),
            found
        )))
    }
}

/// Structural equality that also requires object fields in the same order.
fn binary_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b.iter())
                    .all(|((ka, va), (kb, vb))| ka == kb && binary_equal(va, vb))
        }
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| binary_equal(x, y))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::ExecutorErrorCode;

    fn event(id: Value, sort_key: Value) -> Document {
        Document::from_value(json!({"_id": id, "operationType": "insert"}))
            .unwrap()
            .with_sort_key(sort_key)
    }

    #[test]
    fn test_unmodified_id_passes() {
        let token = json!({"_data": {"clusterTime": 5, "tokenType": 128}});
        let validator = ChangeStreamIdValidator::new(false);

        assert!(validator.validate(&event(token.clone(), token)).is_ok());
    }

    #[test]
    fn test_modified_id_is_fatal() {
        let token = json!({"_data": {"clusterTime": 5, "tokenType": 128}});
        let validator = ChangeStreamIdValidator::new(false);

        let err = validator
            .validate(&event(json!("rewritten"), token))
            .unwrap_err();
        assert_eq!(err.code(), ExecutorErrorCode::AeroChangeStreamFatal);
        assert!(err.is_fatal());
        assert!(err.message().contains("Expected: {\"_id\":{\"_data\""));
        assert!(err.message().contains("but found: {\"_id\":\"rewritten\"}"));
    }

    #[test]
    fn test_reordered_id_is_fatal() {
        let token = json!({"_data": {"clusterTime": 5, "tokenType": 128}});
        let reordered = json!({"_data": {"tokenType": 128, "clusterTime": 5}});
        let validator = ChangeStreamIdValidator::new(false);

        let err = validator.validate(&event(reordered, token)).unwrap_err();
        assert_eq!(err.code(), ExecutorErrorCode::AeroChangeStreamFatal);
    }

    #[test]
    fn test_binary_equal_is_order_sensitive() {
        assert!(binary_equal(&json!({"a": [1, {"b": 2}]}), &json!({"a": [1, {"b": 2}]})));
        assert!(!binary_equal(&json!({"a": 1, "b": 2}), &json!({"b": 2, "a": 1})));
        assert!(!binary_equal(&json!([{"a": 1, "b": 2}]), &json!([{"b": 2, "a": 1}])));
        assert!(!binary_equal(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
    }

    #[test]
    fn test_missing_id_is_fatal() {
        let token = json!({"_data": {"clusterTime": 5, "tokenType": 128}});
        let doc = Document::from_value(json!({"operationType": "insert"}))
            .unwrap()
            .with_sort_key(token);

        let err = ChangeStreamIdValidator::new(false)
            .validate(&doc)
            .unwrap_err();
        assert!(err.message().ends_with("but found: {}"));
    }

    #[test]
    fn test_non_object_sort_key_is_fatal() {
        let validator = ChangeStreamIdValidator::new(false);
        let err = validator
            .validate(&event(json!("abc"), json!("abc")))
            .unwrap_err();
        assert_eq!(err.code(), ExecutorErrorCode::AeroChangeStreamFatal);
    }

    #[test]
    fn test_merge_bound_output_skips_check() {
        let token = json!({"_data": {"clusterTime": 5, "tokenType": 128}});
        let validator = ChangeStreamIdValidator::new(true);

        assert!(validator.validate(&event(json!("rewritten"), token)).is_ok());
    }

    #[test]
    fn test_missing_sort_key_is_invariant_violation() {
        let doc = Document::from_value(json!({"_id": 1})).unwrap();
        let err = ChangeStreamIdValidator::new(false)
            .validate(&doc)
            .unwrap_err();
        assert_eq!(err.code(), ExecutorErrorCode::AeroInvariantViolation);
    }
}
