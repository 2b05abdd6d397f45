//! Observability for pipeline executors
//!
//! - Structured logging goes through `tracing`; the library never installs a
//!   subscriber, the host process does
//! - Counters live in `ExecutorMetrics`
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on execution

mod metrics;

pub use metrics::{ExecutorMetrics, MetricsSnapshot};
