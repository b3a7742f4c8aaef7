//! Application handlers.
//!
//! Command and query handlers that drive the call domain through its ports.

pub mod analytics;
pub mod calls;
pub mod voice;

pub use analytics::{
    CallAnalyticsHandler, ConversationAnalyticsHandler, ConversationAnalyticsQuery,
    ConversationAnalyticsReport, PerformanceMetricsHandler, PerformanceMetricsQuery,
    PerformanceReport,
};
pub use calls::{
    ActiveCallView, ActiveCallsView, EndCallCommand, EndCallHandler, EndCallResult,
    EscalateCallCommand, EscalateCallHandler, EscalateCallResult, GetCallHandler,
    ListActiveCallsHandler, StartCallCommand, StartCallHandler, TranscriptView,
};
pub use voice::{
    ProcessAudioCommand, ProcessAudioHandler, ProcessAudioResult, SimulateConversationCommand,
    SimulateConversationHandler, SimulationResult, TextToSpeechCommand, TextToSpeechHandler,
    VoicePipeline,
};
