//! API error types
//!
//! Subsystem errors pass through with their own codes. The API adds
//! the boundary conditions: malformed envelopes, unknown identifiers,
//! and write-once schema conflicts.

use thiserror::Error;

use crate::record::RecordError;
use crate::schema::SchemaError;
use crate::stats::StatsError;
use crate::store::StoreError;

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request, record, or identifier
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Unknown schema: {id}")]
    UnknownSchema { id: String },

    #[error("Schema '{id}' is already registered")]
    SchemaAlreadyExists { id: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Inconsistency(#[from] StatsError),

    #[error(transparent)]
    Store(StoreError),

    /// Transport-level failure outside the core, e.g. a worker panic
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists { id } => ApiError::SchemaAlreadyExists { id },
            other => ApiError::Store(other),
        }
    }
}

impl ApiError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        ApiError::InvalidInput(reason.into())
    }

    pub fn unknown_schema(id: impl Into<String>) -> Self {
        ApiError::UnknownSchema { id: id.into() }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "SHAPE_INVALID_INPUT",
            ApiError::UnknownOperation(_) => "SHAPE_UNKNOWN_OPERATION",
            ApiError::UnknownSchema { .. } => "SHAPE_UNKNOWN_SCHEMA",
            ApiError::SchemaAlreadyExists { .. } => "SHAPE_SCHEMA_ALREADY_EXISTS",
            ApiError::Schema(e) => e.code(),
            ApiError::Record(e) => e.code(),
            ApiError::Inconsistency(e) => e.code(),
            ApiError::Store(e) => e.code(),
            ApiError::Internal(_) => "SHAPE_INTERNAL",
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> u16 {
        match self {
            ApiError::InvalidInput(_)
            | ApiError::UnknownOperation(_)
            | ApiError::Schema(_)
            | ApiError::Record(_) => 400,
            ApiError::UnknownSchema { .. } => 404,
            ApiError::SchemaAlreadyExists { .. } => 409,
            ApiError::Inconsistency(e) if !e.is_defect() => 422,
            ApiError::Inconsistency(_) | ApiError::Store(_) | ApiError::Internal(_) => 500,
        }
    }
}
