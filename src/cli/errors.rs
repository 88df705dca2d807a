//! CLI-specific error types
//!
//! Every CLI error ends the process with a nonzero status.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::record::RecordError;
use crate::schema::SchemaError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Stdio(#[from] io::Error),

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to open stores: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Record(#[from] RecordError),
}

impl CliError {
    pub fn config(msg: impl Into<String>) -> Self {
        CliError::Config(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CliError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        CliError::Json {
            path: path.into(),
            source,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "SHAPE_CLI_CONFIG_ERROR",
            CliError::Io { .. } | CliError::Stdio(_) => "SHAPE_CLI_IO_ERROR",
            CliError::Json { .. } => "SHAPE_CLI_INVALID_JSON",
            CliError::Store(e) => e.code(),
            CliError::Schema(e) => e.code(),
            CliError::Record(e) => e.code(),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
