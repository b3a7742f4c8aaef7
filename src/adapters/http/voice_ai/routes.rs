//! HTTP routes for voice endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use crate::adapters::http::state::AppState;

use super::handlers::{prompt_templates, process_audio, simulate_conversation, text_to_speech};

/// Routes mounted under `/api/v1/voice-ai`.
pub fn voice_ai_routes() -> Router<AppState> {
    Router::new()
        .route("/simulate-conversation", post(simulate_conversation))
        .route("/process-audio/:call_id", post(process_audio))
        .route("/text-to-speech", post(text_to_speech))
        .route("/prompt-templates", get(prompt_templates))
}
