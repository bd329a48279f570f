use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use floe_common::models::{QueryResult, WarehouseSize};
use floe_core::ControlPlane;
use floe_error::ControlPlaneError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Identity header set by the authenticating gateway in front of this
/// service. Verification is upstream's job; the control plane only maps.
pub const IDENTITY_HEADER: &str = "x-floe-identity";

#[derive(Debug, Deserialize)]
pub struct QueryBody {
    pub sql: String,
    #[serde(default)]
    pub size_hint: Option<WarehouseSize>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
    pub truncated: bool,
    pub row_count: usize,
}

impl From<QueryResult> for QueryResponse {
    fn from(result: QueryResult) -> Self {
        Self {
            row_count: result.row_count(),
            columns: result.columns,
            rows: result.rows,
            truncated: result.truncated,
        }
    }
}

pub fn create_router(plane: Arc<ControlPlane>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .nest("/api/v1", create_api_router(plane))
}

pub fn create_api_router(plane: Arc<ControlPlane>) -> Router {
    Router::new()
        .route("/query", post(run_query))
        .with_state(plane)
}

async fn run_query(
    State(plane): State<Arc<ControlPlane>>,
    headers: HeaderMap,
    Json(body): Json<QueryBody>,
) -> Response {
    let identity = match headers.get(IDENTITY_HEADER).and_then(|v| v.to_str().ok()) {
        Some(identity) if !identity.is_empty() => identity.to_string(),
        _ => {
            return error_response(
                StatusCode::UNAUTHORIZED,
                &ControlPlaneError::identity("<missing identity header>"),
            )
        }
    };

    match plane.run_query(&identity, &body.sql, body.size_hint).await {
        Ok(result) => (StatusCode::OK, Json(QueryResponse::from(result))).into_response(),
        Err(err) => error_response(status_for(&err), &err),
    }
}

fn status_for(err: &ControlPlaneError) -> StatusCode {
    match err {
        ControlPlaneError::Identity { .. } => StatusCode::UNAUTHORIZED,
        ControlPlaneError::PolicyViolation { .. } => StatusCode::FORBIDDEN,
        ControlPlaneError::Execution { .. } => StatusCode::BAD_REQUEST,
        ControlPlaneError::Connection { .. } => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn error_response(status: StatusCode, err: &ControlPlaneError) -> Response {
    let mut body = serde_json::to_value(err).unwrap_or_else(|_| json!({}));
    if let Some(obj) = body.as_object_mut() {
        obj.insert("code".to_string(), json!(err.code().as_str()));
        obj.insert("message".to_string(), json!(err.to_string()));
        obj.insert("retryable".to_string(), json!(err.retryable()));
    }
    (status, Json(body)).into_response()
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn ready_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ready" }))
}
