//! Resume tokens
//!
//! A resume token is handed to clients so that a later scan can continue from
//! the same position. This module holds the decoded token model and the codec
//! that converts it to and from its document form.

mod codec;
mod errors;
mod token;

pub use codec::{JsonResumeTokenCodec, ResumeTokenCodec, RESUME_TOKEN_DATA_FIELD};
pub use errors::{ResumeTokenError, ResumeTokenResult};
pub use token::{ResumeTokenData, TokenType, RESUME_TOKEN_VERSION};
