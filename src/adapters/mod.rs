//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the call domain to external systems:
//! - `ai` - Language providers (OpenAI, mock) and the LLM intent classifier
//! - `registry` - In-memory call registry with per-call turn locks
//! - `speech` - Simulated speech-to-text and text-to-speech
//! - `telephony` - Simulated telephony gateway
//! - `handoff` - In-memory human handoff queue
//! - `http` - Axum routes, DTOs and error mapping

pub mod ai;
pub mod handoff;
pub mod http;
pub mod registry;
pub mod speech;
pub mod telephony;
