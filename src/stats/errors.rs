//! Statistics error types
//!
//! Type errors are defects: the engine only sees records that passed
//! validation, so a value contradicting its declared type means the
//! validator and resolver disagree. Overflow is the one error caused by
//! valid input, e.g. doubles of opposite sign near the f64 limits.

use thiserror::Error;

use crate::schema::TypeTag;

/// Error code for a value contradicting its declared type
pub const INTERNAL_INCONSISTENCY: &str = "SHAPE_INTERNAL_INCONSISTENCY";

/// Error code for a record whose values would overflow the statistics
pub const STATISTICS_OVERFLOW: &str = "SHAPE_STATISTICS_OVERFLOW";

/// Result type for statistics operations
pub type StatsResult<T> = Result<T, StatsError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("Value at '{path}' is {actual}, statistics expected {expected}")]
    TypeMismatch {
        path: String,
        expected: TypeTag,
        actual: TypeTag,
    },

    #[error("Value at '{path}' declared {type_tag} has no numeric projection")]
    NotNumeric { path: String, type_tag: TypeTag },

    /// Folding the value would push mean or variance out of f64 range
    #[error("Statistics at '{path}' would overflow")]
    Overflow { path: String },
}

impl StatsError {
    pub fn code(&self) -> &'static str {
        match self {
            StatsError::Overflow { .. } => STATISTICS_OVERFLOW,
            _ => INTERNAL_INCONSISTENCY,
        }
    }

    /// Overflow comes from caller data; every other variant is a defect.
    pub fn is_defect(&self) -> bool {
        !matches!(self, StatsError::Overflow { .. })
    }

    /// Dotted path of the offending value
    pub fn path(&self) -> &str {
        match self {
            StatsError::TypeMismatch { path, .. }
            | StatsError::NotNumeric { path, .. }
            | StatsError::Overflow { path } => path,
        }
    }
}
