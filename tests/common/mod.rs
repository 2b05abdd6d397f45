//! Shared test utilities for integration tests
//!
//! `ScriptedPipeline` replays a fixed list of steps. Each step moves the
//! pipeline's oplog position, and a shared clock lets a test move the
//! position after the script runs out.

#![allow(dead_code)]

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

use aerocursor::document::Document;
use aerocursor::exec::{ExecutorError, ExecutorResult, ExpressionContext};
use aerocursor::pipeline::{Pipeline, PipelineNext};
use aerocursor::repl::{OperationContext, Timestamp};
use aerocursor::resume_token::{JsonResumeTokenCodec, ResumeTokenCodec, ResumeTokenData};
use serde_json::{json, Value};

enum Step {
    Produce(Document),
    TopologyChange(Value),
    Fail(String),
}

/// Pipeline that replays scripted steps
pub struct ScriptedPipeline {
    steps: VecDeque<(Step, Timestamp)>,
    clock: Rc<Cell<Timestamp>>,
    end_at: Option<Timestamp>,
    disposals: Rc<Cell<usize>>,
}

impl ScriptedPipeline {
    pub fn new() -> Self {
        Self {
            steps: VecDeque::new(),
            clock: Rc::new(Cell::new(Timestamp::NULL)),
            end_at: None,
            disposals: Rc::new(Cell::new(0)),
        }
    }

    /// Starts the pipeline at oplog position `ts`.
    pub fn starting_at(self, ts: u64) -> Self {
        self.clock.set(Timestamp::new(ts));
        self
    }

    /// Produces `doc`, moving the position to `ts`.
    pub fn produce(mut self, doc: Document, ts: u64) -> Self {
        self.steps.push_back((Step::Produce(doc), Timestamp::new(ts)));
        self
    }

    /// Signals a topology change carrying `event`, moving the position to `ts`.
    pub fn topology_change(mut self, event: Value, ts: u64) -> Self {
        self.steps
            .push_back((Step::TopologyChange(event), Timestamp::new(ts)));
        self
    }

    /// Fails with `reason`.
    pub fn fail(mut self, reason: &str, ts: u64) -> Self {
        self.steps
            .push_back((Step::Fail(reason.to_string()), Timestamp::new(ts)));
        self
    }

    /// Moves the position to `ts` when the script runs out.
    pub fn end_at(mut self, ts: u64) -> Self {
        self.end_at = Some(Timestamp::new(ts));
        self
    }

    /// Handle for moving the oplog position from the test.
    pub fn clock(&self) -> Rc<Cell<Timestamp>> {
        Rc::clone(&self.clock)
    }

    /// Handle counting `dispose` calls.
    pub fn disposals(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.disposals)
    }
}

impl Pipeline for ScriptedPipeline {
    fn get_next(&mut self) -> ExecutorResult<PipelineNext> {
        let Some((step, ts)) = self.steps.pop_front() else {
            if let Some(ts) = self.end_at.take() {
                self.clock.set(ts);
            }
            return Ok(PipelineNext::EndOfStream);
        };

        self.clock.set(ts);
        match step {
            Step::Produce(doc) => Ok(PipelineNext::Advanced(doc)),
            Step::TopologyChange(event) => Ok(PipelineNext::TopologyChange(event)),
            Step::Fail(reason) => Err(ExecutorError::pipeline_failed(reason)),
        }
    }

    fn latest_oplog_timestamp(&self) -> Timestamp {
        self.clock.get()
    }

    fn post_batch_resume_token(&self) -> Value {
        JsonResumeTokenCodec.high_water_mark_token(self.clock.get())
    }

    fn dispose(&mut self) {
        self.disposals.set(self.disposals.get() + 1);
    }
}

/// Event resume token at `ts`.
pub fn event_token(ts: u64) -> Value {
    JsonResumeTokenCodec.encode(&ResumeTokenData::event(
        Timestamp::new(ts),
        None,
        json!({"documentKey": {"_id": ts}}),
    ))
}

/// High-water-mark resume token at `ts`.
pub fn hwm_token(ts: u64) -> Value {
    JsonResumeTokenCodec.high_water_mark_token(Timestamp::new(ts))
}

/// Change event at `ts` whose `_id` matches its sort key.
pub fn change_event(ts: u64) -> Document {
    let token = event_token(ts);
    Document::from_value(json!({
        "_id": token.clone(),
        "operationType": "insert",
        "fullDocument": {"_id": ts},
    }))
    .unwrap()
    .with_sort_key(token)
}

/// Change event at `ts` whose `_id` was rewritten by a stage.
pub fn rewritten_event(ts: u64) -> Document {
    Document::from_value(json!({"_id": "rewritten", "operationType": "insert"}))
        .unwrap()
        .with_sort_key(event_token(ts))
}

/// Plain document.
pub fn doc(value: Value) -> Document {
    Document::from_value(value).unwrap()
}

/// Expression context for a non-merging query.
pub fn plain_ctx(op_ctx: Arc<OperationContext>) -> Arc<ExpressionContext> {
    Arc::new(ExpressionContext::new(op_ctx))
}

/// Expression context for a change stream starting at a high-water mark.
pub fn change_stream_ctx(
    start: u64,
    needs_merge: bool,
    op_ctx: Arc<OperationContext>,
) -> Arc<ExpressionContext> {
    let mut ctx = ExpressionContext::new(op_ctx);
    ctx.needs_merge = needs_merge;
    ctx.initial_post_batch_resume_token = Some(hwm_token(start));
    Arc::new(ctx)
}

/// Cluster time encoded in `token`.
pub fn cluster_time(token: &Value) -> Timestamp {
    JsonResumeTokenCodec.parse(token).unwrap().cluster_time
}
