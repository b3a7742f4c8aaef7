//! HTTP handlers for voice endpoints.

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::{call_error_response, json_rejection_response};
use crate::adapters::http::state::AppState;
use crate::application::handlers::{
    ProcessAudioCommand, SimulateConversationCommand, TextToSpeechCommand,
};
use crate::domain::call::CallError;
use crate::domain::foundation::CallId;

use super::dto::{
    ProcessAudioParams, PromptTemplateView, PromptTemplatesResponse, SimulateConversationRequest,
    TextToSpeechRequest,
};

/// POST /api/v1/voice-ai/simulate-conversation
pub async fn simulate_conversation(
    State(state): State<AppState>,
    body: Result<Json<SimulateConversationRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(json) => json,
        Err(rejection) => return json_rejection_response(rejection),
    };
    let cmd = SimulateConversationCommand {
        scenario: req.scenario,
        utterances: req.utterances,
    };
    match state.simulate_conversation.handle(cmd).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => call_error_response(e),
    }
}

/// POST /api/v1/voice-ai/process-audio/:call_id - Raw audio body
pub async fn process_audio(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
    Query(params): Query<ProcessAudioParams>,
    body: Bytes,
) -> Response {
    let call_id = match call_id.parse::<CallId>() {
        Ok(id) => id,
        Err(e) => return call_error_response(CallError::Validation(e)),
    };
    tracing::debug!(call_id = %call_id, bytes = body.len(), "audio received");

    let cmd = ProcessAudioCommand {
        call_id,
        audio: body.to_vec(),
        voice_id: params.voice_id,
    };
    match state.process_audio.handle(cmd).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => call_error_response(e),
    }
}

/// POST /api/v1/voice-ai/text-to-speech
pub async fn text_to_speech(
    State(state): State<AppState>,
    body: Result<Json<TextToSpeechRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(json) => json,
        Err(rejection) => return json_rejection_response(rejection),
    };
    let cmd = TextToSpeechCommand {
        text: req.text,
        voice_id: req.voice_id,
    };
    match state.text_to_speech.handle(cmd).await {
        Ok(speech) => (StatusCode::OK, Json(speech)).into_response(),
        Err(e) => call_error_response(e),
    }
}

/// GET /api/v1/voice-ai/prompt-templates
pub async fn prompt_templates(State(state): State<AppState>) -> Response {
    let templates: Vec<PromptTemplateView> = state
        .templates
        .scenarios()
        .into_iter()
        .filter_map(|scenario| state.templates.get(scenario).ok())
        .map(PromptTemplateView::from)
        .collect();

    let response = PromptTemplatesResponse {
        total: templates.len(),
        templates,
    };
    (StatusCode::OK, Json(response)).into_response()
}
