//! Executor error types
//!
//! Error codes:
//! - AERO_PIPELINE_FAILED (ERROR)
//! - AERO_INVALID_RESUME_TOKEN (ERROR)
//! - AERO_INVARIANT_VIOLATION (FATAL)
//! - AERO_CHANGE_STREAM_FATAL (FATAL)

use std::fmt;

use crate::resume_token::ResumeTokenError;

/// Severity levels for executor errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation failed but the cursor's resume state is intact
    Error,
    /// The cursor must not be used further
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Executor-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorErrorCode {
    /// The underlying pipeline failed to produce a document
    AeroPipelineFailed,
    /// A resume token could not be decoded
    AeroInvalidResumeToken,
    /// The executor was used in a way its contract forbids
    AeroInvariantViolation,
    /// A change stream event can no longer be resumed from
    AeroChangeStreamFatal,
}

impl ExecutorErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ExecutorErrorCode::AeroPipelineFailed => "AERO_PIPELINE_FAILED",
            ExecutorErrorCode::AeroInvalidResumeToken => "AERO_INVALID_RESUME_TOKEN",
            ExecutorErrorCode::AeroInvariantViolation => "AERO_INVARIANT_VIOLATION",
            ExecutorErrorCode::AeroChangeStreamFatal => "AERO_CHANGE_STREAM_FATAL",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            ExecutorErrorCode::AeroInvariantViolation | ExecutorErrorCode::AeroChangeStreamFatal => {
                Severity::Fatal
            }
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for ExecutorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Executor error type with full context
#[derive(Debug)]
pub struct ExecutorError {
    /// Error code
    code: ExecutorErrorCode,
    /// Human-readable message
    message: String,
    /// Underlying resume token error, if any
    source: Option<ResumeTokenError>,
}

impl ExecutorError {
    /// Create a pipeline failure. Producers use this to report their own
    /// errors; the executor propagates it unchanged.
    pub fn pipeline_failed(reason: impl Into<String>) -> Self {
        Self {
            code: ExecutorErrorCode::AeroPipelineFailed,
            message: reason.into(),
            source: None,
        }
    }

    /// Create an invalid resume token error
    pub fn invalid_resume_token(context: impl Into<String>, source: ResumeTokenError) -> Self {
        Self {
            code: ExecutorErrorCode::AeroInvalidResumeToken,
            message: context.into(),
            source: Some(source),
        }
    }

    /// Create an invariant violation (FATAL)
    pub fn invariant_violation(reason: impl Into<String>) -> Self {
        Self {
            code: ExecutorErrorCode::AeroInvariantViolation,
            message: reason.into(),
            source: None,
        }
    }

    /// Create a change stream fatal error (FATAL)
    pub fn change_stream_fatal(reason: impl Into<String>) -> Self {
        Self {
            code: ExecutorErrorCode::AeroChangeStreamFatal,
            message: reason.into(),
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ExecutorErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// Returns whether retrying the operation could succeed.
    ///
    /// Fatal errors are never retryable.
    pub fn is_retryable(&self) -> bool {
        self.code == ExecutorErrorCode::AeroPipelineFailed
    }
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExecutorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;
