//! Document model

mod document;

pub use document::{Document, DocumentError, DocumentMetadata, SORT_KEY_FIELD};
