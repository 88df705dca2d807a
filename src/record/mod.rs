//! Record subsystem
//!
//! Caller-submitted records are decoded from JSON into a closed value
//! union before any schema check runs. Decoding failures are input
//! errors, never validation failures.

mod decode;
mod errors;
mod value;

pub use decode::{json_type_name, LITERAL_PREFIX};
pub use errors::{RecordError, RecordResult, INVALID_INPUT};
pub use value::{Record, Value};
