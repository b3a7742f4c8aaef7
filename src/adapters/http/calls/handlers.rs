//! HTTP handlers for call endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::{call_error_response, json_rejection_response};
use crate::adapters::http::state::AppState;
use crate::application::handlers::{EndCallCommand, EscalateCallCommand, StartCallCommand};
use crate::domain::call::CallError;
use crate::domain::foundation::CallId;

use super::dto::{EscalateRequest, StartCallRequest, TurnRequest, TurnResponse};

fn parse_call_id(raw: &str) -> Result<CallId, Response> {
    raw.parse::<CallId>()
        .map_err(|e| call_error_response(CallError::Validation(e)))
}

/// POST /api/v1/calls - Start a call
pub async fn start_call(
    State(state): State<AppState>,
    body: Result<Json<StartCallRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(json) => json,
        Err(rejection) => return json_rejection_response(rejection),
    };
    let cmd = StartCallCommand {
        call_id: req.call_id,
        scenario: req.scenario,
    };
    match state.start_call.handle(cmd).await {
        Ok(call) => (StatusCode::CREATED, Json(call)).into_response(),
        Err(e) => call_error_response(e),
    }
}

/// GET /api/v1/calls/active - Calls that have not ended
pub async fn list_active_calls(State(state): State<AppState>) -> Response {
    match state.list_active_calls.handle().await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => call_error_response(e),
    }
}

/// GET /api/v1/calls/:call_id - Full conversation state
pub async fn get_call(State(state): State<AppState>, Path(call_id): Path<String>) -> Response {
    let call_id = match parse_call_id(&call_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.get_call.state(&call_id).await {
        Ok(call) => (StatusCode::OK, Json(call)).into_response(),
        Err(e) => call_error_response(e),
    }
}

/// GET /api/v1/calls/:call_id/transcript
pub async fn get_transcript(State(state): State<AppState>, Path(call_id): Path<String>) -> Response {
    let call_id = match parse_call_id(&call_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.get_call.transcript(&call_id).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => call_error_response(e),
    }
}

/// GET /api/v1/calls/:call_id/summary - Handoff summary
pub async fn get_summary(State(state): State<AppState>, Path(call_id): Path<String>) -> Response {
    let call_id = match parse_call_id(&call_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.get_call.summary(&call_id).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => call_error_response(e),
    }
}

/// POST /api/v1/calls/:call_id/turns - Handle one caller utterance
pub async fn handle_turn(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
    body: Result<Json<TurnRequest>, JsonRejection>,
) -> Response {
    let call_id = match parse_call_id(&call_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Json(req) = match body {
        Ok(json) => json,
        Err(rejection) => return json_rejection_response(rejection),
    };
    match state.orchestrator.handle_turn(&call_id, &req.text, req.confidence).await {
        Ok(outcome) => (StatusCode::OK, Json(TurnResponse::from(outcome))).into_response(),
        Err(e) => call_error_response(e),
    }
}

/// POST /api/v1/calls/:call_id/escalate - Manual escalation, body optional
pub async fn escalate_call(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
    body: Result<Json<EscalateRequest>, JsonRejection>,
) -> Response {
    let call_id = match parse_call_id(&call_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let req = match body {
        Ok(Json(req)) => req,
        Err(JsonRejection::MissingJsonContentType(_)) => EscalateRequest::default(),
        Err(rejection) => return json_rejection_response(rejection),
    };
    let cmd = EscalateCallCommand {
        call_id,
        reason: req.reason,
    };
    match state.escalate_call.handle(cmd).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => call_error_response(e),
    }
}

/// POST /api/v1/calls/:call_id/end - Retire a call
pub async fn end_call(State(state): State<AppState>, Path(call_id): Path<String>) -> Response {
    let call_id = match parse_call_id(&call_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.end_call.handle(EndCallCommand { call_id }).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => call_error_response(e),
    }
}

/// GET /api/v1/calls/:call_id/analytics
pub async fn get_call_analytics(State(state): State<AppState>, Path(call_id): Path<String>) -> Response {
    let call_id = match parse_call_id(&call_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.call_analytics.handle(&call_id).await {
        Ok(analytics) => (StatusCode::OK, Json(analytics)).into_response(),
        Err(e) => call_error_response(e),
    }
}
