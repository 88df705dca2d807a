//! Response envelope
//!
//! `{"status": "ok", "data": ...}` or
//! `{"status": "error", "code": ..., "message": ...}`

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::ApiError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub status: String,
    pub data: Value,
}

impl SuccessResponse {
    pub fn new(data: Value) -> Self {
        Self {
            status: "ok".to_string(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn from_error(err: &ApiError) -> Self {
        Self {
            status: "error".to_string(),
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Unified response type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Success(SuccessResponse),
    Error(ErrorResponse),
}

impl Response {
    pub fn success(data: Value) -> Self {
        Response::Success(SuccessResponse::new(data))
    }

    pub fn error(err: &ApiError) -> Self {
        Response::Error(ErrorResponse::from_error(err))
    }

    /// Single-line JSON text
    pub fn to_json(&self) -> String {
        serde_json::to_value(self)
            .unwrap_or(Value::Null)
            .to_string()
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_response() {
        let json = Response::success(json!({"number_of_records": 2})).to_json();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("number_of_records"));
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_error_response() {
        let resp = Response::error(&ApiError::unknown_schema("rooms"));
        assert!(!resp.is_success());
        let json: Value = serde_json::from_str(&resp.to_json()).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["code"], "SHAPE_UNKNOWN_SCHEMA");
        assert_eq!(json["message"], "Unknown schema: rooms");
    }
}
