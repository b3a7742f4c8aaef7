//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (identifiers, validation errors)
//! - `call` - Conversation state, intents, escalation policy and prompt templates

pub mod call;
pub mod foundation;
