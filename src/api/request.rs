//! Request envelope for the line-oriented interface
//!
//! `{"op": "register"|"submit"|"analysis"|"rebuild"|"schema",
//!   "schema_id": ..., "fields"?: [...], "record"?: {...}}`

use serde::Deserialize;
use serde_json::Value;

use super::errors::{ApiError, ApiResult};

/// One parsed request
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Register { schema_id: String, fields: Value },
    Submit { schema_id: String, record: Value },
    Analysis { schema_id: String },
    Rebuild { schema_id: String },
    Schema { schema_id: String },
}

#[derive(Debug, Deserialize)]
struct RawRequest {
    op: String,
    #[serde(default)]
    schema_id: Option<String>,
    #[serde(default)]
    fields: Option<Value>,
    #[serde(default)]
    record: Option<Value>,
}

impl Request {
    /// Parse a request from JSON text
    pub fn parse(json: &str) -> ApiResult<Self> {
        let raw: RawRequest = serde_json::from_str(json)
            .map_err(|e| ApiError::invalid_input(format!("Invalid JSON: {}", e)))?;

        let schema_id = || {
            raw.schema_id
                .clone()
                .ok_or_else(|| ApiError::invalid_input("Missing schema_id"))
        };

        match raw.op.as_str() {
            "register" => Ok(Request::Register {
                schema_id: schema_id()?,
                fields: raw
                    .fields
                    .clone()
                    .ok_or_else(|| ApiError::invalid_input("Missing fields"))?,
            }),
            "submit" => Ok(Request::Submit {
                schema_id: schema_id()?,
                record: raw
                    .record
                    .clone()
                    .ok_or_else(|| ApiError::invalid_input("Missing record"))?,
            }),
            "analysis" => Ok(Request::Analysis {
                schema_id: schema_id()?,
            }),
            "rebuild" => Ok(Request::Rebuild {
                schema_id: schema_id()?,
            }),
            "schema" => Ok(Request::Schema {
                schema_id: schema_id()?,
            }),
            other => Err(ApiError::UnknownOperation(other.to_string())),
        }
    }
}
