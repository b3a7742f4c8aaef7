//! HTTP adapter for analytics queries.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::adapters::http::error::call_error_response;
use crate::adapters::http::state::AppState;
use crate::application::handlers::analytics::DEFAULT_WINDOW_MINUTES;
use crate::application::handlers::{ConversationAnalyticsQuery, PerformanceMetricsQuery};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsParams {
    #[serde(default)]
    pub window_minutes: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversationAnalyticsParams {
    #[serde(default)]
    pub scenario: Option<String>,
    #[serde(default)]
    pub date_range: Option<String>,
}

/// GET /api/v1/analytics/performance-metrics?window_minutes=N
pub async fn performance_metrics(State(state): State<AppState>, Query(params): Query<MetricsParams>) -> Response {
    let query = PerformanceMetricsQuery {
        window_minutes: params.window_minutes.unwrap_or(DEFAULT_WINDOW_MINUTES),
    };
    match state.performance_metrics.handle(query).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => call_error_response(e),
    }
}

/// GET /api/v1/analytics/conversation-analytics?scenario=S&date_range=7d
pub async fn conversation_analytics(
    State(state): State<AppState>,
    Query(params): Query<ConversationAnalyticsParams>,
) -> Response {
    let query = ConversationAnalyticsQuery {
        scenario: params.scenario,
        date_range: params.date_range,
    };
    match state.conversation_analytics.handle(query).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => call_error_response(e),
    }
}

/// Routes mounted under `/api/v1/analytics`.
pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/performance-metrics", get(performance_metrics))
        .route("/conversation-analytics", get(conversation_analytics))
}
