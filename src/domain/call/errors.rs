//! Error types for the call domain

use thiserror::Error;

use crate::domain::foundation::{CallId, ValidationError};

/// Failures surfaced to callers of the call operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CallError {
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("Call {0} already exists and has not ended")]
    DuplicateCall(CallId),

    #[error("Call {0} not found")]
    UnknownCall(CallId),

    #[error("Call {0} has ended")]
    CallEnded(CallId),

    #[error("Language generation unavailable for call {call_id}: {reason}")]
    GenerationUnavailable { call_id: CallId, reason: String },

    #[error("Turn for call {0} was cancelled")]
    Cancelled(CallId),

    #[error("Invariant violation on call {call_id}: {reason}")]
    InvariantViolation { call_id: CallId, reason: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("{collaborator} collaborator failed: {reason}")]
    Collaborator {
        collaborator: &'static str,
        reason: String,
    },
}

impl CallError {
    /// Whether the same request may succeed if tried again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CallError::GenerationUnavailable { .. }
                | CallError::Cancelled(_)
                | CallError::Collaborator { .. }
        )
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            CallError::UnknownScenario(_) => "UNKNOWN_SCENARIO",
            CallError::DuplicateCall(_) => "DUPLICATE_CALL",
            CallError::UnknownCall(_) => "UNKNOWN_CALL",
            CallError::CallEnded(_) => "CALL_ENDED",
            CallError::GenerationUnavailable { .. } => "GENERATION_UNAVAILABLE",
            CallError::Cancelled(_) => "CANCELLED",
            CallError::InvariantViolation { .. } => "INVARIANT_VIOLATION",
            CallError::Validation(_) => "VALIDATION_FAILED",
            CallError::Collaborator { .. } => "COLLABORATOR_UNAVAILABLE",
        }
    }
}

/// Intent classification could not be performed.
///
/// Never propagated out of a classifier; it is logged and the turn
/// proceeds with an `unknown` intent.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Classification degraded: {reason}")]
pub struct ClassificationDegraded {
    pub reason: String,
}

impl ClassificationDegraded {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call_id() -> CallId {
        CallId::new("CA100").unwrap()
    }

    #[test]
    fn test_unknown_call_message() {
        let err = CallError::UnknownCall(call_id());
        assert_eq!(err.to_string(), "Call CA100 not found");
        assert_eq!(err.code(), "UNKNOWN_CALL");
    }

    #[test]
    fn test_generation_unavailable_is_retryable() {
        let err = CallError::GenerationUnavailable {
            call_id: call_id(),
            reason: "timeout".to_string(),
        };
        assert!(err.is_retryable());
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_lookup_errors_are_not_retryable() {
        assert!(!CallError::CallEnded(call_id()).is_retryable());
        assert!(!CallError::DuplicateCall(call_id()).is_retryable());
        assert!(!CallError::UnknownScenario("x".to_string()).is_retryable());
    }

    #[test]
    fn test_validation_error_converts() {
        let err: CallError = ValidationError::empty_field("text").into();
        assert_eq!(err.code(), "VALIDATION_FAILED");
    }

    #[test]
    fn test_classification_degraded_message() {
        let err = ClassificationDegraded::new("provider timed out");
        assert_eq!(err.to_string(), "Classification degraded: provider timed out");
    }
}
