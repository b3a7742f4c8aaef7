//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port, plus the intent classifier
//! that delegates to one.
//!
//! ## Available Adapters
//!
//! - `MockAIProvider` - Scripted provider for the demo and tests
//! - `OpenAIProvider` - OpenAI chat completions
//! - `LlmIntentClassifier` - IntentClassifier over any AIProvider

mod llm_intent_classifier;
mod mock_provider;
mod openai_provider;

pub use llm_intent_classifier::LlmIntentClassifier;
pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
