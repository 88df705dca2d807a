//! Store error types
//!
//! Error codes:
//! - SHAPE_STORE_IO: filesystem failure
//! - SHAPE_STORE_CORRUPTION: checksum mismatch or unparseable stored data
//! - SHAPE_STORE_SERIALIZATION: a value could not be encoded
//! - SHAPE_SCHEMA_ALREADY_EXISTS: schema identifiers are write-once

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Corrupted data in {path}: {detail}")]
    Corruption { path: PathBuf, detail: String },

    #[error("Failed to encode {what}: {source}")]
    Serialization {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Schema '{id}' is already registered")]
    AlreadyExists { id: String },
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Io { .. } => "SHAPE_STORE_IO",
            StoreError::Corruption { .. } => "SHAPE_STORE_CORRUPTION",
            StoreError::Serialization { .. } => "SHAPE_STORE_SERIALIZATION",
            StoreError::AlreadyExists { .. } => "SHAPE_SCHEMA_ALREADY_EXISTS",
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corruption(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        StoreError::Corruption {
            path: path.into(),
            detail: detail.into(),
        }
    }

    pub(crate) fn serialization(what: impl Into<String>, source: serde_json::Error) -> Self {
        StoreError::Serialization {
            what: what.into(),
            source,
        }
    }
}
