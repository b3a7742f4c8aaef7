//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the call domain and the outside world. Adapters implement these ports.
//!
//! ## State
//!
//! - `CallRegistry` - Ownership of per-call conversation state
//!
//! ## Collaborators
//!
//! - `AIProvider` - Language generation and understanding
//! - `SpeechToText` / `TextToSpeech` - Speech conversion
//! - `TelephonyGateway` - Outbound speech and call control
//! - `HumanHandoff` - Routing escalated calls to agents

mod ai_provider;
mod call_registry;
mod handoff;
mod speech;
mod telephony;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, RequestPurpose, TokenUsage,
};
pub use call_registry::{CallRegistry, RegistryError, StateMutator, TurnGuard};
pub use handoff::{HandoffError, HandoffRequest, HumanHandoff, RoutingAck};
pub use speech::{SpeechError, SpeechToText, SynthesizedSpeech, TextToSpeech, Transcription};
pub use telephony::{CallControl, TelephonyError, TelephonyGateway};
