//! Pipeline contract
//!
//! The executor does not run stages itself. It drives a `Pipeline`, a
//! producer that hands out one document per call, and reads the producer's
//! oplog position when the scan is resumable.

use serde_json::{Map, Value};

use crate::document::Document;
use crate::exec::ExecutorResult;
use crate::repl::Timestamp;

/// Outcome of asking a pipeline for its next document
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineNext {
    /// A document was produced
    Advanced(Document),

    /// The cluster topology changed. The payload is the change event to
    /// return in place of a regular document, serialized with metadata.
    TopologyChange(Value),

    /// No more documents are available
    EndOfStream,
}

/// A producer of documents.
///
/// Errors returned from `get_next` are passed to the caller untouched.
pub trait Pipeline {
    /// Produces the next document.
    fn get_next(&mut self) -> ExecutorResult<PipelineNext>;

    /// Latest oplog timestamp the pipeline has observed.
    ///
    /// Only consulted for resumable scans; may run ahead of the last
    /// returned document.
    fn latest_oplog_timestamp(&self) -> Timestamp {
        Timestamp::NULL
    }

    /// Resume token describing the pipeline's current oplog scan position.
    ///
    /// Only consulted for oplog scans.
    fn post_batch_resume_token(&self) -> Value {
        Value::Object(Map::new())
    }

    /// Releases resources held by the pipeline. The executor calls this once.
    fn dispose(&mut self) {}
}
