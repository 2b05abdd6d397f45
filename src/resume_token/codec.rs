//! Resume token encoding
//!
//! The executor never looks inside a token beyond what this trait exposes:
//! decoding a token to its cluster time, and minting high-water-mark tokens.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::errors::{ResumeTokenError, ResumeTokenResult};
use super::token::ResumeTokenData;
use crate::repl::Timestamp;

/// Field holding the encoded token contents
pub const RESUME_TOKEN_DATA_FIELD: &str = "_data";

/// Converts between resume token documents and their decoded contents
pub trait ResumeTokenCodec {
    /// Decodes a token document.
    fn parse(&self, token: &Value) -> ResumeTokenResult<ResumeTokenData>;

    /// Encodes token contents as a token document.
    fn encode(&self, data: &ResumeTokenData) -> Value;

    /// Builds a high-water-mark token for `cluster_time`.
    fn high_water_mark_token(&self, cluster_time: Timestamp) -> Value {
        self.encode(&ResumeTokenData::high_water_mark(cluster_time))
    }
}

/// Encodes tokens as `{"_data": { ...token fields... }}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonResumeTokenCodec;

impl ResumeTokenCodec for JsonResumeTokenCodec {
    fn parse(&self, token: &Value) -> ResumeTokenResult<ResumeTokenData> {
        let token = token.as_object().ok_or(ResumeTokenError::NotAnObject)?;
        let data = token
            .get(RESUME_TOKEN_DATA_FIELD)
            .ok_or(ResumeTokenError::MissingData)?;
        if !data.is_object() {
            return Err(ResumeTokenError::MalformedData);
        }
        Ok(ResumeTokenData::deserialize(data)?)
    }

    fn encode(&self, data: &ResumeTokenData) -> Value {
        let mut token = Map::new();
        token.insert(
            RESUME_TOKEN_DATA_FIELD.to_string(),
            serde_json::to_value(data).unwrap_or(Value::Null),
        );
        Value::Object(token)
    }
}
