//! aerocursor - A resumable, pull-based document cursor
//!
//! Wraps a pipeline that produces documents one at a time and exposes it as a
//! cursor a database server can drive: callers pull the next document, may push
//! documents back for redelivery, and can read the resume position a client
//! needs to continue an equivalent scan later.
//!
//! # Subsystems
//!
//! - `document`: documents and their metadata (sort key)
//! - `repl`: oplog timestamps and speculative majority read tracking
//! - `resume_token`: resume token model and codec
//! - `pipeline`: the producer contract the cursor drives
//! - `exec`: the plan executor, resumable scan state and change stream checks
//! - `observability`: executor metrics
//! - `config`: executor options

pub mod config;
pub mod document;
pub mod exec;
pub mod observability;
pub mod pipeline;
pub mod repl;
pub mod resume_token;
