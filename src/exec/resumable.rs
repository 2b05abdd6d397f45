//! Resumable scan state
//!
//! Tracks the latest oplog timestamp reflected in the resume position and the
//! post-batch resume token handed to clients.
//!
//! # Update rules
//!
//! Change stream:
//! - Event returned: timestamp comes from the pipeline, token is the event's
//!   sort key
//! - Exhausted: advance to a high-water-mark token only if the pipeline has
//!   moved strictly past the stored timestamp
//!
//! Oplog scan: both values are copied from the pipeline on every call.
//!
//! # Invariants
//!
//! - High-water marks never move the timestamp backwards
//! - Events and oplog positions copy the pipeline's timestamp as-is, so the
//!   timestamp only stays monotonic if the pipeline's position does
//! - Timestamp and token are always replaced together

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::document::Document;
use crate::pipeline::Pipeline;
use crate::repl::Timestamp;
use crate::resume_token::ResumeTokenCodec;

use super::context::ExpressionContext;
use super::errors::{ExecutorError, ExecutorResult};
use super::state::ResumableScanType;
use super::validator::ChangeStreamIdValidator;

/// What a resume state update did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanUpdate {
    /// Nothing changed
    Unchanged,
    /// Seeded from the change stream's initial token
    Seeded,
    /// Moved to the position of a returned change event
    Event,
    /// Moved to a synthesized high-water mark
    HighWaterMark,
    /// Copied from the pipeline's oplog position
    OplogPosition,
}

impl ScanUpdate {
    /// Returns true if the update should be reported to the speculative read
    /// tracker.
    pub fn forwards_read_timestamp(&self) -> bool {
        matches!(
            self,
            ScanUpdate::Event | ScanUpdate::HighWaterMark | ScanUpdate::OplogPosition
        )
    }
}

/// Resume position of a scan
#[derive(Debug, Clone)]
pub struct ResumableScanState {
    scan_type: ResumableScanType,
    latest_oplog_timestamp: Timestamp,
    post_batch_resume_token: Value,
    validator: ChangeStreamIdValidator,
}

impl ResumableScanState {
    /// Creates empty state for `scan_type`. Call [`bootstrap`](Self::bootstrap)
    /// before the first update.
    pub fn new(scan_type: ResumableScanType, needs_merge: bool) -> Self {
        Self {
            scan_type,
            latest_oplog_timestamp: Timestamp::NULL,
            post_batch_resume_token: Value::Object(Map::new()),
            validator: ChangeStreamIdValidator::new(needs_merge),
        }
    }

    /// Returns the scan discipline.
    pub fn scan_type(&self) -> ResumableScanType {
        self.scan_type
    }

    /// Latest oplog timestamp reflected in the resume token.
    pub fn latest_oplog_timestamp(&self) -> Timestamp {
        self.latest_oplog_timestamp
    }

    /// Resume token for the end of the current batch.
    pub fn post_batch_resume_token(&self) -> &Value {
        &self.post_batch_resume_token
    }

    /// Sets the initial resume position.
    ///
    /// Change streams start from the token in the expression context. Oplog
    /// scans read the pipeline's position right away so that a first batch
    /// of size zero still carries a usable token.
    pub fn bootstrap<P, C>(
        &mut self,
        exp_ctx: &ExpressionContext,
        pipeline: &P,
        codec: &C,
    ) -> ExecutorResult<ScanUpdate>
    where
        P: Pipeline + ?Sized,
        C: ResumeTokenCodec + ?Sized,
    {
        match self.scan_type {
            ResumableScanType::None => Ok(ScanUpdate::Unchanged),
            ResumableScanType::ChangeStream => {
                let token = exp_ctx
                    .initial_post_batch_resume_token
                    .as_ref()
                    .filter(|token| token.as_object().is_some_and(|t| !t.is_empty()))
                    .ok_or_else(|| {
                        ExecutorError::invariant_violation(
                            "expected initial post-batch resume token to be not empty",
                        )
                    })?;
                let data = codec.parse(token).map_err(|e| {
                    ExecutorError::invalid_resume_token("initial post-batch resume token", e)
                })?;

                self.post_batch_resume_token = token.clone();
                self.latest_oplog_timestamp = data.cluster_time;
                debug!(latest_ts = %self.latest_oplog_timestamp, "change stream resume state seeded");
                Ok(ScanUpdate::Seeded)
            }
            ResumableScanType::OplogScan => Ok(self.record_oplog_position(pipeline)),
        }
    }

    /// Updates the resume position after the pipeline was asked for a
    /// document. `document` is `None` when the pipeline was exhausted.
    pub fn update<P, C>(
        &mut self,
        document: Option<&Document>,
        pipeline: &P,
        codec: &C,
    ) -> ExecutorResult<ScanUpdate>
    where
        P: Pipeline + ?Sized,
        C: ResumeTokenCodec + ?Sized,
    {
        match self.scan_type {
            ResumableScanType::None => Ok(ScanUpdate::Unchanged),
            ResumableScanType::ChangeStream => match document {
                Some(event) => self.record_change_event(event, pipeline),
                None => Ok(self.record_high_water_mark(pipeline, codec)),
            },
            ResumableScanType::OplogScan => Ok(self.record_oplog_position(pipeline)),
        }
    }

    fn record_change_event<P>(&mut self, event: &Document, pipeline: &P) -> ExecutorResult<ScanUpdate>
    where
        P: Pipeline + ?Sized,
    {
        self.validator.validate(event)?;

        let token = event
            .metadata()
            .sort_key()
            .filter(|key| key.is_object())
            .ok_or_else(|| {
                ExecutorError::invariant_violation("change stream event sort key must be an object")
            })?
            .clone();

        self.latest_oplog_timestamp = pipeline.latest_oplog_timestamp();
        self.post_batch_resume_token = token;
        trace!(latest_ts = %self.latest_oplog_timestamp, "resume state advanced to event");
        Ok(ScanUpdate::Event)
    }

    fn record_high_water_mark<P, C>(&mut self, pipeline: &P, codec: &C) -> ScanUpdate
    where
        P: Pipeline + ?Sized,
        C: ResumeTokenCodec + ?Sized,
    {
        // Every returned event moves the stored timestamp, so a strictly later
        // position cannot have an event still pending at it.
        let high_water_mark = pipeline.latest_oplog_timestamp();
        if high_water_mark <= self.latest_oplog_timestamp {
            trace!(
                latest_ts = %self.latest_oplog_timestamp,
                high_water_mark = %high_water_mark,
                "high-water mark not ahead of resume state"
            );
            return ScanUpdate::Unchanged;
        }

        self.post_batch_resume_token = codec.high_water_mark_token(high_water_mark);
        self.latest_oplog_timestamp = high_water_mark;
        debug!(high_water_mark = %high_water_mark, "resume state advanced to high-water mark");
        ScanUpdate::HighWaterMark
    }

    fn record_oplog_position<P>(&mut self, pipeline: &P) -> ScanUpdate
    where
        P: Pipeline + ?Sized,
    {
        self.latest_oplog_timestamp = pipeline.latest_oplog_timestamp();
        self.post_batch_resume_token = pipeline.post_batch_resume_token();
        trace!(latest_ts = %self.latest_oplog_timestamp, "resume state copied from oplog position");
        ScanUpdate::OplogPosition
    }
}
