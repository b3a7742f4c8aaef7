//! Shared state for every HTTP route.

use std::sync::Arc;

use crate::application::handlers::{
    CallAnalyticsHandler, ConversationAnalyticsHandler, EndCallHandler, EscalateCallHandler,
    GetCallHandler, ListActiveCallsHandler, PerformanceMetricsHandler, ProcessAudioHandler, SimulateConversationHandler, StartCallHandler,
    TextToSpeechHandler,
};
use crate::application::TurnOrchestrator;
use crate::domain::call::PromptTemplateStore;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<TurnOrchestrator>,
    pub templates: Arc<PromptTemplateStore>,
    pub start_call: Arc<StartCallHandler>,
    pub get_call: Arc<GetCallHandler>,
    pub escalate_call: Arc<EscalateCallHandler>,
    pub end_call: Arc<EndCallHandler>,
    pub list_active_calls: Arc<ListActiveCallsHandler>,
    pub simulate_conversation: Arc<SimulateConversationHandler>,
    pub process_audio: Arc<ProcessAudioHandler>,
    pub text_to_speech: Arc<TextToSpeechHandler>,
    pub performance_metrics: Arc<PerformanceMetricsHandler>,
    pub call_analytics: Arc<CallAnalyticsHandler>,
    pub conversation_analytics: Arc<ConversationAnalyticsHandler>,
}
