//! Schema error types
//!
//! All schema construction failures share one code:
//! - SHAPE_SCHEMA_INVALID (REJECT)
//!
//! Paths are dotted from the root; `$root` names the top-level list.

use thiserror::Error;

use super::types::TypeTag;

/// Error code reported for every schema construction failure
pub const SCHEMA_INVALID: &str = "SHAPE_SCHEMA_INVALID";

/// Schema construction error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The field list (root or `field_attributes`) is not an array
    #[error("field list at '{path}' must be an array")]
    NotAnArray { path: String },

    /// An entry in a field list is not an object
    #[error("entry {index} of '{path}' must be an object")]
    EntryNotObject { path: String, index: usize },

    /// An entry has no usable name
    #[error("entry {index} of '{path}' has no name")]
    MissingName { path: String, index: usize },

    /// A field has no type
    #[error("field '{field}' has no type")]
    MissingType { field: String },

    /// A declared type does not map to a known tag
    #[error("field '{field}' declares unknown type '{type_name}'")]
    UnknownType { field: String, type_name: String },

    /// A customobject without its nested field list
    #[error("field '{field}' is a customobject without field_attributes")]
    MissingNestedFields { field: String },

    /// A non-nested field carrying a nested field list
    #[error("field '{field}' of type {type_tag} must not declare field_attributes")]
    UnexpectedNestedFields { field: String, type_tag: TypeTag },

    /// Two fields with the same name at one level
    #[error("field '{field}' is declared more than once")]
    DuplicateField { field: String },
}

impl SchemaError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        SCHEMA_INVALID
    }
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
