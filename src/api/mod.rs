//! API layer for shapestat
//!
//! The API layer sits between the transports (stdin loop, HTTP) and
//! the core. It owns the stores and serializes every analysis
//! read-modify-write behind one lock.
//!
//! # Supported Operations
//!
//! - register
//! - submit
//! - analysis
//! - rebuild
//! - schema

mod errors;
mod handler;
mod request;
mod response;

pub use errors::{ApiError, ApiResult};
pub use handler::{validate_identifier, AnalysisMode, ApiHandler, SubmitOutcome, MAX_IDENTIFIER_LEN};
pub use request::Request;
pub use response::{ErrorResponse, Response, SuccessResponse};
