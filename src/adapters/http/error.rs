//! Error responses for the REST API.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::call::CallError;

/// Non-standard "client closed request" status used for cancelled turns.
const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Error body shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }
}

pub fn status_for(error: &CallError) -> StatusCode {
    match error {
        CallError::UnknownScenario(_) | CallError::Validation(_) => StatusCode::BAD_REQUEST,
        CallError::UnknownCall(_) => StatusCode::NOT_FOUND,
        CallError::DuplicateCall(_) | CallError::CallEnded(_) => StatusCode::CONFLICT,
        CallError::GenerationUnavailable { .. } | CallError::Collaborator { .. } => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        CallError::Cancelled(_) => {
            StatusCode::from_u16(CLIENT_CLOSED_REQUEST).unwrap_or(StatusCode::REQUEST_TIMEOUT)
        }
        CallError::InvariantViolation { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Map a call error onto status code and body.
pub fn call_error_response(error: CallError) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        tracing::error!(code = error.code(), error = %error, "request failed");
    }

    let mut body = ErrorResponse::new(error.code(), error.to_string());
    if error.is_retryable() {
        body = body.with_details(serde_json::json!({ "retryable": true }));
    }
    (status, Json(body)).into_response()
}

/// Map a rejected JSON body (bad syntax, wrong shape, missing content
/// type) onto the shared error body.
pub fn json_rejection_response(rejection: JsonRejection) -> Response {
    tracing::debug!(status = %rejection.status(), error = %rejection.body_text(), "request body rejected");
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::bad_request(rejection.body_text())),
    )
        .into_response()
}
