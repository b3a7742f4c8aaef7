//! HTTP adapter for the voice pipeline and prompt templates.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ProcessAudioParams, PromptTemplateView, PromptTemplatesResponse, SimulateConversationRequest,
    TextToSpeechRequest,
};
pub use routes::voice_ai_routes;
