//! HTTP routes for call endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use crate::adapters::http::state::AppState;

use super::handlers::{
    end_call, escalate_call, get_call, get_call_analytics, get_summary, get_transcript,
    handle_turn, list_active_calls, start_call,
};

/// Routes mounted under `/api/v1/calls`.
pub fn call_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(start_call))
        .route("/active", get(list_active_calls))
        .route("/:call_id", get(get_call))
        .route("/:call_id/transcript", get(get_transcript))
        .route("/:call_id/summary", get(get_summary))
        .route("/:call_id/analytics", get(get_call_analytics))
        .route("/:call_id/turns", post(handle_turn))
        .route("/:call_id/escalate", post(escalate_call))
        .route("/:call_id/end", post(end_call))
}
