//! # HTTP API
//!
//! JSON over HTTP:
//!
//! - `GET /health`
//! - `POST /execute {"query": ...}` returns a `DecisionResult`
//! - `POST /can-answer {"query": ...}` returns an `Answerability`
//!
//! An empty query is rejected with 400 and `{"error": ...}`.

use crate::engine::Engine;
use assay_core::{Answerability, DecisionResult};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// An error mapped to a status code and a JSON body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

// =============================================================================
// ROUTER
// =============================================================================

/// Build the API router around a shared engine.
pub fn router(engine: Arc<Engine>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/execute", post(execute))
        .route("/can-answer", post(can_answer))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(engine)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(engine: Arc<Engine>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "assay API listening");
    axum::serve(listener, router(engine))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("ok"),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn require_query(request: &QueryRequest) -> Result<&str, ApiError> {
    let query = request.query.trim();
    if query.is_empty() {
        Err(ApiError::bad_request("query must not be empty"))
    } else {
        Ok(query)
    }
}

async fn execute(
    State(engine): State<Arc<Engine>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<DecisionResult>, ApiError> {
    let query = require_query(&request)?;
    Ok(Json(engine.execute(query).await))
}

async fn can_answer(
    State(engine): State<Arc<Engine>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<Answerability>, ApiError> {
    let query = require_query(&request)?;
    Ok(Json(engine.can_answer(query)))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_is_bad_request() {
        let request = QueryRequest {
            query: String::from(" \t"),
        };
        let status = require_query(&request).err().map(|e| e.status);
        assert_eq!(status, Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn query_is_trimmed() {
        let request = QueryRequest {
            query: String::from("  what is rust?  "),
        };
        assert_eq!(require_query(&request).ok(), Some("what is rust?"));
    }
}
