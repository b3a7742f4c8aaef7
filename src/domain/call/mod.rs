//! Call domain - the conversational core of a voice call.
//!
//! Pure types and rules: conversation state, intents, the escalation
//! policy, prompt templates and the reports derived from call state.
//! Nothing here performs I/O.

mod analytics;
mod conversation_state;
mod errors;
mod escalation;
mod intent;
mod metrics;
mod prompt;
mod scenario;
mod services;
pub mod slots;
mod summary;
mod utterance;

pub use analytics::{
    CallAnalytics, ConfidenceBands, ConversationAnalytics, DateRange, IntentCount,
};
pub use conversation_state::{CallStatus, ConversationState};
pub use errors::{CallError, ClassificationDegraded};
pub use escalation::{
    EscalationDecision, EscalationPolicy, EscalationReason, CLOSING_UTTERANCE, HANDOFF_UTTERANCE,
};
pub use intent::{Intent, IntentClassification};
pub use metrics::PerformanceMetrics;
pub use prompt::{
    templates, ExampleRole, ExampleTurn, PromptStoreError, PromptTemplate, PromptTemplateStore,
    PRIVACY_PREAMBLE,
};
pub use scenario::Scenario;
pub use services::{IntentClassifier, KeywordIntentClassifier};
pub use summary::HandoffSummary;
pub use utterance::{Speaker, Utterance};
