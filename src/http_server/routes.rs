//! Schema HTTP routes
//!
//! Endpoints for registering schemas, submitting records, and reading
//! analyses. Handlers move the synchronous API call onto the blocking
//! pool so store I/O never stalls the async workers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;

use crate::api::{ApiError, ApiHandler, ApiResult};

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            error: self.code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check route
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_handler))
}

async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    (StatusCode::OK, Json(response))
}

/// Routes under `/schemas`
pub fn schema_routes(handler: Arc<ApiHandler>) -> Router {
    Router::new()
        .route("/", get(list_schemas))
        .route("/:id", post(register_schema).get(get_schema))
        .route("/:id/records", post(submit_record))
        .route("/:id/analysis", get(fetch_analysis))
        .route("/:id/analysis/rebuild", post(rebuild_analysis))
        .with_state(handler)
}

/// Runs `f` on the blocking pool.
async fn blocking<T, F>(handler: Arc<ApiHandler>, f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&ApiHandler) -> ApiResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&handler))
        .await
        .map_err(|e| ApiError::Internal(format!("request worker failed: {}", e)))?
}

fn parse_body(body: &Bytes) -> ApiResult<Value> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::invalid_input(format!("Invalid JSON body: {}", e)))
}

async fn list_schemas(State(handler): State<Arc<ApiHandler>>) -> ApiResult<Json<Value>> {
    let ids = blocking(handler, |h| h.schema_ids()).await?;
    Ok(Json(serde_json::json!({ "schemas": ids })))
}

async fn register_schema(
    State(handler): State<Arc<ApiHandler>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let raw = parse_body(&body)?;
    let analysis = blocking(handler, move |h| h.register_schema(&id, &raw)).await?;
    Ok((StatusCode::CREATED, Json(analysis)))
}

async fn get_schema(
    State(handler): State<Arc<ApiHandler>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let schema = blocking(handler, move |h| h.get_schema(&id)).await?;
    Ok(Json(schema.to_json()))
}

async fn submit_record(
    State(handler): State<Arc<ApiHandler>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let raw = parse_body(&body)?;
    let outcome = blocking(handler, move |h| h.submit_record(&id, &raw)).await?;
    let status = if outcome.accepted {
        StatusCode::CREATED
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    Ok((status, Json(outcome)))
}

async fn fetch_analysis(
    State(handler): State<Arc<ApiHandler>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let analysis = blocking(handler, move |h| h.fetch_analysis(&id)).await?;
    Ok(Json(analysis))
}

async fn rebuild_analysis(
    State(handler): State<Arc<ApiHandler>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let analysis = blocking(handler, move |h| h.rebuild_analysis(&id)).await?;
    Ok(Json(analysis))
}
