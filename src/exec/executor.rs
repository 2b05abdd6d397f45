//! Pipeline plan executor
//!
//! Turns a `Pipeline` into a cursor. Each retrieval call:
//! 1. Redelivers a pushed-back document if one is stashed (`get_next` only)
//! 2. Otherwise asks the pipeline for its next document
//! 3. Treats a topology change as an ordinary document
//! 4. Updates the resumable scan state, on success and on exhaustion alike
//! 5. Forwards the resume timestamp to the speculative read tracker
//!
//! # Invariants
//!
//! - Once the pipeline reports end of stream, `is_eof` stays true apart from
//!   stashed documents
//! - Callers that push documents back must retrieve through `get_next`
//! - The pipeline is disposed exactly once

use std::collections::VecDeque;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ExecutorOptions;
use crate::document::Document;
use crate::observability::ExecutorMetrics;
use crate::pipeline::{Pipeline, PipelineNext};
use crate::repl::{OperationContext, Timestamp};
use crate::resume_token::{JsonResumeTokenCodec, ResumeTokenCodec};

use super::context::ExpressionContext;
use super::errors::{ExecutorError, ExecutorErrorCode, ExecutorResult};
use super::explainer::PlanExplainer;
use super::resumable::{ResumableScanState, ScanUpdate};
use super::state::{ExecState, OutputRequest, ResumableScanType};

/// Cursor over a pipeline's output
pub struct PlanExecutorPipeline<P: Pipeline, C: ResumeTokenCodec = JsonResumeTokenCodec> {
    exp_ctx: Arc<ExpressionContext>,
    pipeline: P,
    codec: C,
    explainer: PlanExplainer,
    metrics: Arc<ExecutorMetrics>,
    scan_state: ResumableScanState,

    /// Pushed-back documents, delivered front first
    stash: VecDeque<Document>,
    /// Set once `enqueue` has been used
    enqueued: bool,

    /// Sticky once the pipeline reports end of stream
    pipeline_is_eof: bool,
    /// First kill reason recorded
    kill_status: Option<String>,
    disposed: bool,
}

impl<P: Pipeline> PlanExecutorPipeline<P, JsonResumeTokenCodec> {
    /// Creates an executor using the default resume token codec.
    pub fn new(
        exp_ctx: Arc<ExpressionContext>,
        pipeline: P,
        scan_type: ResumableScanType,
    ) -> ExecutorResult<Self> {
        Self::with_codec(exp_ctx, pipeline, scan_type, JsonResumeTokenCodec)
    }

    /// Creates an executor from validated options.
    pub fn from_options(
        options: &ExecutorOptions,
        op_ctx: Arc<OperationContext>,
        pipeline: P,
    ) -> ExecutorResult<Self> {
        options.validate()?;
        let exp_ctx = Arc::new(ExpressionContext::from_options(options, op_ctx));
        Self::new(exp_ctx, pipeline, options.resumable_scan_type)
    }
}

impl<P: Pipeline, C: ResumeTokenCodec> PlanExecutorPipeline<P, C> {
    /// Creates an executor with an explicit resume token codec.
    ///
    /// For resumable scans the initial resume position is established here:
    /// change streams decode the initial token from `exp_ctx`, oplog scans
    /// read the pipeline's current position.
    pub fn with_codec(
        exp_ctx: Arc<ExpressionContext>,
        pipeline: P,
        scan_type: ResumableScanType,
        codec: C,
    ) -> ExecutorResult<Self> {
        let mut executor = Self {
            explainer: PlanExplainer::new(scan_type, exp_ctx.needs_merge),
            scan_state: ResumableScanState::new(scan_type, exp_ctx.needs_merge),
            exp_ctx,
            pipeline,
            codec,
            metrics: Arc::new(ExecutorMetrics::new()),
            stash: VecDeque::new(),
            enqueued: false,
            pipeline_is_eof: false,
            kill_status: None,
            disposed: false,
        };

        let update = executor
            .scan_state
            .bootstrap(&executor.exp_ctx, &executor.pipeline, &executor.codec)?;
        executor.after_scan_update(update);

        debug!(
            scan_type = %scan_type,
            latest_ts = %executor.scan_state.latest_oplog_timestamp(),
            "pipeline executor created"
        );
        Ok(executor)
    }

    /// Reports counters to a shared registry instead of a private one.
    pub fn with_metrics(mut self, metrics: Arc<ExecutorMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Returns the next result as a raw object.
    ///
    /// Stashed documents are returned before new ones are produced.
    /// Documents are serialized with metadata when output is merge-bound.
    pub fn get_next(&mut self, request: OutputRequest) -> ExecutorResult<(ExecState, Option<Value>)> {
        if request == OutputRequest::ObjectAndRecordId {
            return Err(ExecutorError::invariant_violation(
                "pipeline executors do not track record ids",
            ));
        }
        self.ensure_not_disposed()?;

        if let Some(document) = self.stash.pop_front() {
            self.explainer.increment_n_returned();
            self.metrics.increment_documents_returned();
            self.metrics.increment_stash_redeliveries();
            return Ok((ExecState::Advanced, self.render(request, &document)));
        }

        let (state, document) = self.next_document()?;
        let object = document.and_then(|doc| self.render(request, &doc));
        Ok((state, object))
    }

    /// Returns the next result as a document.
    ///
    /// Must not be used by callers that push documents back.
    pub fn get_next_document(&mut self) -> ExecutorResult<(ExecState, Option<Document>)> {
        if self.enqueued {
            return Err(ExecutorError::invariant_violation(
                "get_next_document cannot be used after enqueue; use get_next",
            ));
        }
        self.ensure_not_disposed()?;
        self.next_document()
    }

    /// Pushes a document back. It is returned by the next `get_next` call,
    /// ahead of anything the pipeline produces.
    pub fn enqueue(&mut self, document: Document) {
        self.enqueued = true;
        self.stash.push_back(document);
    }

    /// Returns true if no stashed documents remain and the pipeline is
    /// exhausted.
    pub fn is_eof(&self) -> bool {
        if !self.stash.is_empty() {
            return false;
        }
        self.pipeline_is_eof
    }

    /// Records why the executor was killed. Only the first reason is kept.
    ///
    /// This does not interrupt anything; the host loop is expected to check
    /// [`kill_status`](Self::kill_status).
    pub fn mark_as_killed(&mut self, reason: impl Into<String>) -> ExecutorResult<()> {
        let reason = reason.into();
        if reason.is_empty() {
            return Err(ExecutorError::invariant_violation(
                "kill reason must not be empty",
            ));
        }

        if self.kill_status.is_none() {
            warn!(reason = %reason, "pipeline executor marked as killed");
            self.metrics.increment_kills();
            self.kill_status = Some(reason);
        }
        Ok(())
    }

    /// Returns the kill reason, if killed.
    pub fn kill_status(&self) -> Option<&str> {
        self.kill_status.as_deref()
    }

    /// Disposes the pipeline. Later calls do nothing.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.pipeline.dispose();
        debug!(n_returned = self.explainer.n_returned(), "pipeline executor disposed");
    }

    /// Returns true once the pipeline has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Latest oplog timestamp reflected in the resume token.
    pub fn latest_oplog_timestamp(&self) -> Timestamp {
        self.scan_state.latest_oplog_timestamp()
    }

    /// Resume token for the end of the current batch.
    pub fn post_batch_resume_token(&self) -> &Value {
        self.scan_state.post_batch_resume_token()
    }

    /// Returns the resumable scan discipline.
    pub fn scan_type(&self) -> ResumableScanType {
        self.scan_state.scan_type()
    }

    /// Returns execution statistics.
    pub fn explainer(&self) -> &PlanExplainer {
        &self.explainer
    }

    /// Returns the metrics registry this executor reports to.
    pub fn metrics(&self) -> &Arc<ExecutorMetrics> {
        &self.metrics
    }

    /// Returns the expression context.
    pub fn expression_context(&self) -> &Arc<ExpressionContext> {
        &self.exp_ctx
    }

    fn ensure_not_disposed(&self) -> ExecutorResult<()> {
        if self.disposed {
            return Err(ExecutorError::invariant_violation(
                "pipeline executor used after dispose",
            ));
        }
        Ok(())
    }

    fn render(&self, request: OutputRequest, document: &Document) -> Option<Value> {
        match request {
            OutputRequest::StateOnly => None,
            _ if self.exp_ctx.needs_merge => Some(document.to_value_with_metadata()),
            _ => Some(document.to_value()),
        }
    }

    fn next_document(&mut self) -> ExecutorResult<(ExecState, Option<Document>)> {
        match self.advance()? {
            Some(document) => {
                self.explainer.increment_n_returned();
                self.metrics.increment_documents_returned();
                Ok((ExecState::Advanced, Some(document)))
            }
            None => Ok((ExecState::IsEof, None)),
        }
    }

    /// Produces the next document and updates the resume state.
    ///
    /// The resume state is updated on exhaustion too: the high-water mark is
    /// read at the moment the pipeline runs dry.
    fn advance(&mut self) -> ExecutorResult<Option<Document>> {
        let next = if self.pipeline_is_eof {
            None
        } else {
            self.try_get_next()?
        };
        if next.is_none() {
            self.pipeline_is_eof = true;
        }

        self.update_resumable_scan_state(next.as_ref())?;
        Ok(next)
    }

    fn try_get_next(&mut self) -> ExecutorResult<Option<Document>> {
        match self.pipeline.get_next()? {
            PipelineNext::Advanced(document) => Ok(Some(document)),
            PipelineNext::TopologyChange(event) => {
                debug!("topology change event returned as document");
                self.metrics.increment_topology_changes();
                Document::from_value_with_metadata(event)
                    .map(Some)
                    .map_err(|e| {
                        ExecutorError::invariant_violation(format!(
                            "malformed topology change event: {}",
                            e
                        ))
                    })
            }
            PipelineNext::EndOfStream => Ok(None),
        }
    }

    fn update_resumable_scan_state(&mut self, document: Option<&Document>) -> ExecutorResult<()> {
        let update = self
            .scan_state
            .update(document, &self.pipeline, &self.codec)
            .map_err(|e| {
                if e.code() == ExecutorErrorCode::AeroChangeStreamFatal {
                    self.metrics.increment_resume_token_validation_failures();
                }
                e
            })?;
        self.after_scan_update(update);
        Ok(())
    }

    fn after_scan_update(&self, update: ScanUpdate) {
        if update == ScanUpdate::HighWaterMark {
            self.metrics.increment_high_water_mark_advances();
        }
        if update.forwards_read_timestamp() {
            self.set_speculative_read_timestamp();
        }
    }

    fn set_speculative_read_timestamp(&self) {
        let info = self.exp_ctx.op_ctx.speculative_read_info();
        let latest = self.scan_state.latest_oplog_timestamp();
        if info.is_speculative_read() && !latest.is_null() {
            info.set_speculative_read_timestamp_forward(latest);
        }
    }
}

impl<P: Pipeline, C: ResumeTokenCodec> Drop for PlanExecutorPipeline<P, C> {
    fn drop(&mut self) {
        self.dispose();
    }
}
