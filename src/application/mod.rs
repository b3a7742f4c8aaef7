//! Application layer - the turn orchestrator plus command and query handlers.
//!
//! This layer coordinates the call domain with its ports. The orchestrator
//! owns the per-turn workflow; handlers cover the rest of the call lifecycle
//! and the read-side queries.

pub mod handlers;
pub mod orchestrator;
pub mod retry;

pub use orchestrator::{OrchestratorSettings, TurnOrchestrator, TurnOutcome};
pub use retry::{RetryPolicy, RetryableError};
