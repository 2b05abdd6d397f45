//! Pipeline executor subsystem
//!
//! Drives a `Pipeline` as a pull-based cursor while maintaining the resume
//! position a client needs to continue the scan later.
//!
//! # Execution Flow (per call)
//!
//! 1. Return a stashed (pushed-back) document if there is one
//! 2. Ask the pipeline for the next document
//! 3. Materialize topology change events as documents
//! 4. Check change stream `_id` fields
//! 5. Update resume state (change stream or oplog scan rules)
//! 6. Forward the resume timestamp to the speculative read tracker
//!
//! # Invariants
//!
//! - The resume timestamp never moves backwards
//! - A resume token is never emitted at or before an already-returned event
//! - Fail loudly on contract misuse

mod context;
mod cursor;
mod errors;
mod executor;
mod explainer;
mod resumable;
mod state;
mod validator;

pub use context::ExpressionContext;
pub use cursor::{DocumentCursor, RawCursor};
pub use errors::{ExecutorError, ExecutorErrorCode, ExecutorResult, Severity};
pub use executor::PlanExecutorPipeline;
pub use explainer::PlanExplainer;
pub use resumable::{ResumableScanState, ScanUpdate};
pub use state::{ExecState, OutputRequest, ResumableScanType};
pub use validator::ChangeStreamIdValidator;
