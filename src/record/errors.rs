//! Record decoding errors
//!
//! Error codes:
//! - SHAPE_INVALID_INPUT (REJECT)

use thiserror::Error;

use crate::schema::TypeTag;

/// Error code for malformed record input
pub const INVALID_INPUT: &str = "SHAPE_INVALID_INPUT";

/// Record decoding error. Raised before validation ever runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The record itself is not a JSON object
    #[error("record must be a JSON object, got {actual}")]
    NotAnObject { actual: &'static str },

    /// A field holds null
    #[error("field '{path}' is null")]
    NullValue { path: String },

    /// A field holds an array
    #[error("field '{path}' is an array, which has no field type")]
    ArrayValue { path: String },

    /// A typed literal (`{"$short": 7}`) could not be decoded
    #[error("field '{path}': invalid {type_tag} literal: {reason}")]
    InvalidLiteral {
        path: String,
        type_tag: TypeTag,
        reason: String,
    },
}

impl RecordError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        INVALID_INPUT
    }
}

/// Result type for record decoding
pub type RecordResult<T> = Result<T, RecordError>;
