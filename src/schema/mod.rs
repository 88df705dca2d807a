//! Schema subsystem for shapestat
//!
//! A schema is an ordered, recursively nested list of named, typed
//! fields registered under an identifier. Records are checked against
//! it before anything is stored.
//!
//! # Design Principles
//!
//! - Schemas are immutable once registered
//! - Field names are unique per nesting level
//! - No coercion: a value's resolved tag must equal the declared tag
//! - Validation counts every problem instead of stopping at the first
//! - Deterministic validation

mod errors;
mod parser;
mod resolver;
mod types;
mod validator;

pub use errors::{SchemaError, SchemaResult, SCHEMA_INVALID};
pub use parser::parse;
pub use resolver::TypeResolver;
pub use types::{join_path, FieldSpec, SchemaTree, TypeTag};
pub use validator::{
    validate, SchemaValidator, ValidationOutcome, ValidationReport, Violation, ViolationKind,
};
