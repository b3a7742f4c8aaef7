//! Human Handoff Port - routing escalated calls to human agents.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::call::{CallError, EscalationReason, HandoffSummary, Scenario, Utterance};
use crate::domain::foundation::CallId;

/// Everything a human agent needs to pick up the call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandoffRequest {
    pub call_id: CallId,
    pub scenario: Scenario,
    pub reason: Option<EscalationReason>,
    pub turn_history: Vec<Utterance>,
    pub summary: HandoffSummary,
}

/// Routing acknowledgment from the handoff collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingAck {
    pub call_id: CallId,
    pub agent_queue: String,
    /// 1-based position in the queue.
    pub position: usize,
    pub acknowledged_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HandoffError {
    #[error("No agents available in queue {0}")]
    NoAgentsAvailable(String),

    #[error("Handoff service unavailable: {0}")]
    Unavailable(String),
}

impl From<HandoffError> for CallError {
    fn from(err: HandoffError) -> Self {
        CallError::Collaborator {
            collaborator: "handoff",
            reason: err.to_string(),
        }
    }
}

/// Port for the human-handoff collaborator.
#[async_trait]
pub trait HumanHandoff: Send + Sync {
    async fn request_handoff(&self, request: HandoffRequest) -> Result<RoutingAck, HandoffError>;
}
