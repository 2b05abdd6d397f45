//! Documents produced by a pipeline
//!
//! A document is a JSON object plus metadata that travels with it but is not
//! part of its fields. The only metadata tracked today is the sort key, which
//! for change stream events holds the event's resume token.

use serde_json::{Map, Value};
use thiserror::Error;

/// Reserved field under which metadata is serialized for merge-bound output.
pub const SORT_KEY_FIELD: &str = "$sortKey";

/// Errors raised when a JSON value cannot be materialized as a document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// Documents must be JSON objects
    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Metadata attached to a document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMetadata {
    sort_key: Option<Value>,
}

impl DocumentMetadata {
    /// Returns the sort key, if set.
    pub fn sort_key(&self) -> Option<&Value> {
        self.sort_key.as_ref()
    }

    /// Sets the sort key.
    pub fn set_sort_key(&mut self, sort_key: Value) {
        self.sort_key = Some(sort_key);
    }

    /// Returns true if no metadata is set.
    pub fn is_empty(&self) -> bool {
        self.sort_key.is_none()
    }
}

/// A document flowing out of a pipeline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fields: Map<String, Value>,
    metadata: DocumentMetadata,
}

impl Document {
    /// Creates a document from its fields, with no metadata.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            metadata: DocumentMetadata::default(),
        }
    }

    /// Creates a document from a JSON object, treating every field as data.
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        match value {
            Value::Object(fields) => Ok(Self::new(fields)),
            other => Err(DocumentError::NotAnObject(type_name(&other))),
        }
    }

    /// Creates a document from a JSON object serialized with
    /// [`Document::to_value_with_metadata`], lifting the reserved metadata
    /// field back into metadata.
    pub fn from_value_with_metadata(value: Value) -> Result<Self, DocumentError> {
        let mut fields = match value {
            Value::Object(fields) => fields,
            other => return Err(DocumentError::NotAnObject(type_name(&other))),
        };

        let mut metadata = DocumentMetadata::default();
        if let Some(sort_key) = fields.remove(SORT_KEY_FIELD) {
            metadata.set_sort_key(sort_key);
        }

        Ok(Self { fields, metadata })
    }

    /// Sets the sort key, builder style.
    pub fn with_sort_key(mut self, sort_key: Value) -> Self {
        self.metadata.set_sort_key(sort_key);
        self
    }

    /// Returns a field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns all fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Returns the document metadata.
    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    /// Serializes the fields only.
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// Serializes the fields plus metadata, for output that a merging node
    /// will consume.
    pub fn to_value_with_metadata(&self) -> Value {
        let mut fields = self.fields.clone();
        if let Some(sort_key) = self.metadata.sort_key() {
            fields.insert(SORT_KEY_FIELD.to_string(), sort_key.clone());
        }
        Value::Object(fields)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
