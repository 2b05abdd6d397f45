//! Cursor handles
//!
//! A `PlanExecutorPipeline` serves two kinds of callers: those that read raw
//! objects and may push documents back, and those that read documents and
//! never push back. Converting the executor into one of these handles
//! consumes it, so a single executor can never be driven both ways.

use serde_json::Value;

use crate::document::Document;
use crate::pipeline::Pipeline;
use crate::repl::Timestamp;
use crate::resume_token::{JsonResumeTokenCodec, ResumeTokenCodec};

use super::errors::ExecutorResult;
use super::executor::PlanExecutorPipeline;
use super::explainer::PlanExplainer;
use super::state::{ExecState, OutputRequest};

impl<P: Pipeline, C: ResumeTokenCodec> PlanExecutorPipeline<P, C> {
    /// Converts the executor into a raw-object cursor with pushback.
    pub fn into_raw_cursor(self) -> RawCursor<P, C> {
        RawCursor { inner: self }
    }

    /// Converts the executor into a document cursor without pushback.
    pub fn into_document_cursor(self) -> DocumentCursor<P, C> {
        DocumentCursor { inner: self }
    }
}

/// Raw-object cursor. Supports pushing documents back.
pub struct RawCursor<P: Pipeline, C: ResumeTokenCodec = JsonResumeTokenCodec> {
    inner: PlanExecutorPipeline<P, C>,
}

impl<P: Pipeline, C: ResumeTokenCodec> RawCursor<P, C> {
    /// Returns the next result as a raw object.
    pub fn get_next(&mut self, request: OutputRequest) -> ExecutorResult<(ExecState, Option<Value>)> {
        self.inner.get_next(request)
    }

    /// Pushes a document back for redelivery.
    pub fn enqueue(&mut self, document: Document) {
        self.inner.enqueue(document);
    }

    /// See [`PlanExecutorPipeline::is_eof`].
    pub fn is_eof(&self) -> bool {
        self.inner.is_eof()
    }

    /// See [`PlanExecutorPipeline::mark_as_killed`].
    pub fn mark_as_killed(&mut self, reason: impl Into<String>) -> ExecutorResult<()> {
        self.inner.mark_as_killed(reason)
    }

    /// Returns the kill reason, if killed.
    pub fn kill_status(&self) -> Option<&str> {
        self.inner.kill_status()
    }

    /// Latest oplog timestamp reflected in the resume token.
    pub fn latest_oplog_timestamp(&self) -> Timestamp {
        self.inner.latest_oplog_timestamp()
    }

    /// Resume token for the end of the current batch.
    pub fn post_batch_resume_token(&self) -> &Value {
        self.inner.post_batch_resume_token()
    }

    /// Returns execution statistics.
    pub fn explainer(&self) -> &PlanExplainer {
        self.inner.explainer()
    }

    /// Disposes the underlying pipeline.
    pub fn dispose(&mut self) {
        self.inner.dispose();
    }
}

/// Document cursor. Has no pushback.
pub struct DocumentCursor<P: Pipeline, C: ResumeTokenCodec = JsonResumeTokenCodec> {
    inner: PlanExecutorPipeline<P, C>,
}

impl<P: Pipeline, C: ResumeTokenCodec> DocumentCursor<P, C> {
    /// Returns the next result as a document.
    pub fn get_next_document(&mut self) -> ExecutorResult<(ExecState, Option<Document>)> {
        self.inner.get_next_document()
    }

    /// See [`PlanExecutorPipeline::is_eof`].
    pub fn is_eof(&self) -> bool {
        self.inner.is_eof()
    }

    /// See [`PlanExecutorPipeline::mark_as_killed`].
    pub fn mark_as_killed(&mut self, reason: impl Into<String>) -> ExecutorResult<()> {
        self.inner.mark_as_killed(reason)
    }

    /// Returns the kill reason, if killed.
    pub fn kill_status(&self) -> Option<&str> {
        self.inner.kill_status()
    }

    /// Latest oplog timestamp reflected in the resume token.
    pub fn latest_oplog_timestamp(&self) -> Timestamp {
        self.inner.latest_oplog_timestamp()
    }

    /// Resume token for the end of the current batch.
    pub fn post_batch_resume_token(&self) -> &Value {
        self.inner.post_batch_resume_token()
    }

    /// Returns execution statistics.
    pub fn explainer(&self) -> &PlanExplainer {
        self.inner.explainer()
    }

    /// Disposes the underlying pipeline.
    pub fn dispose(&mut self) {
        self.inner.dispose();
    }
}

/// Yields documents until end of stream. Errors are yielded as items.
impl<P: Pipeline, C: ResumeTokenCodec> Iterator for DocumentCursor<P, C> {
    type Item = ExecutorResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.get_next_document() {
            Ok((ExecState::Advanced, Some(document))) => Some(Ok(document)),
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
