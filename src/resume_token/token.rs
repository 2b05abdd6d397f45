//! Resume token contents
//!
//! A resume token names a position in a change stream. Two kinds exist:
//! - Event tokens identify a specific event returned to the client
//! - High-water-mark tokens say "nothing has been seen past this time"
//!
//! At the same cluster time a high-water-mark token sorts before any event
//! token, so resuming from one never skips an event at that time.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::errors::ResumeTokenError;
use crate::repl::Timestamp;

/// Current token format version
pub const RESUME_TOKEN_VERSION: u32 = 2;

/// Kind of position a resume token encodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TokenType {
    /// Synthesized position with no event attached
    HighWaterMark,
    /// Position of a specific event
    Event,
}

impl TokenType {
    /// Numeric code used in the encoded token
    pub fn code(&self) -> u8 {
        match self {
            TokenType::HighWaterMark => 0,
            TokenType::Event => 128,
        }
    }
}

impl From<TokenType> for u8 {
    fn from(token_type: TokenType) -> Self {
        token_type.code()
    }
}

impl TryFrom<u8> for TokenType {
    type Error = ResumeTokenError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TokenType::HighWaterMark),
            128 => Ok(TokenType::Event),
            other => Err(ResumeTokenError::UnknownTokenType(other)),
        }
    }
}

/// Decoded contents of a resume token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeTokenData {
    /// Oplog time of the position
    pub cluster_time: Timestamp,

    /// Token format version
    #[serde(default = "default_version")]
    pub version: u32,

    /// High-water-mark or event
    pub token_type: TokenType,

    /// Index of the operation within an applyOps transaction entry
    #[serde(default)]
    pub txn_op_index: u64,

    /// Whether the token was produced by an invalidate event
    #[serde(default)]
    pub from_invalidate: bool,

    /// Collection the event belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,

    /// Identifies the event within its cluster time (e.g. document key)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_identifier: Option<Value>,
}

fn default_version() -> u32 {
    RESUME_TOKEN_VERSION
}

impl ResumeTokenData {
    /// Creates the data for a high-water-mark token at `cluster_time`.
    pub fn high_water_mark(cluster_time: Timestamp) -> Self {
        Self {
            cluster_time,
            version: RESUME_TOKEN_VERSION,
            token_type: TokenType::HighWaterMark,
            txn_op_index: 0,
            from_invalidate: false,
            uuid: None,
            event_identifier: None,
        }
    }

    /// Creates the data for an event token.
    pub fn event(cluster_time: Timestamp, uuid: Option<Uuid>, event_identifier: Value) -> Self {
        Self {
            cluster_time,
            version: RESUME_TOKEN_VERSION,
            token_type: TokenType::Event,
            txn_op_index: 0,
            from_invalidate: false,
            uuid,
            event_identifier: Some(event_identifier),
        }
    }

    /// Returns true if this is a high-water-mark token.
    pub fn is_high_water_mark(&self) -> bool {
        self.token_type == TokenType::HighWaterMark
    }
}
