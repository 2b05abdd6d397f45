//! # Resume Token Errors

use thiserror::Error;

/// Result type for resume token operations
pub type ResumeTokenResult<T> = Result<T, ResumeTokenError>;

/// Resume token decoding errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResumeTokenError {
    /// The token itself is not a JSON object
    #[error("Resume token must be an object")]
    NotAnObject,

    /// The token has no `_data` field
    #[error("Resume token is missing the '_data' field")]
    MissingData,

    /// `_data` is present but is not an object
    #[error("Resume token '_data' field must be an object")]
    MalformedData,

    /// `_data` could not be decoded into token fields
    #[error("Resume token could not be decoded: {0}")]
    Decode(String),

    /// Unknown token type code
    #[error("Unknown resume token type: {0}")]
    UnknownTokenType(u8),
}

impl From<serde_json::Error> for ResumeTokenError {
    fn from(err: serde_json::Error) -> Self {
        ResumeTokenError::Decode(err.to_string())
    }
}
