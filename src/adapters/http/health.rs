//! Health, readiness and liveness endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::adapters::http::error::ErrorResponse;
use crate::adapters::http::state::AppState;

const SERVICE: &str = "carecall";

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbeResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: DateTime<Utc>,
}

impl ProbeResponse {
    fn new(status: &'static str) -> Self {
        Self {
            status,
            service: SERVICE,
            timestamp: Utc::now(),
        }
    }
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE,
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /health/ready - the call registry answers queries
pub async fn ready(State(state): State<AppState>) -> Response {
    match state.orchestrator.registry().list().await {
        Ok(_) => (StatusCode::OK, Json(ProbeResponse::new("ready"))).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::new("NOT_READY", "Service not ready")),
            )
                .into_response()
        }
    }
}

/// GET /health/live
pub async fn live() -> Json<ProbeResponse> {
    Json(ProbeResponse::new("alive"))
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        .route("/health/live", get(live))
}
