//! Request and response bodies for call endpoints.

use serde::{Deserialize, Serialize};

use crate::application::TurnOutcome;
use crate::domain::call::{CallStatus, EscalationDecision, Intent};
use crate::domain::foundation::CallId;

#[derive(Debug, Clone, Deserialize)]
pub struct StartCallRequest {
    #[serde(default)]
    pub call_id: Option<String>,
    pub scenario: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TurnRequest {
    pub text: String,
    #[serde(default)]
    pub confidence: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResponse {
    pub call_id: CallId,
    pub reply: String,
    pub decision: EscalationDecision,
    pub intent: Intent,
    pub confidence: f32,
    pub status: CallStatus,
    pub turn_count: usize,
}

impl From<TurnOutcome> for TurnResponse {
    fn from(outcome: TurnOutcome) -> Self {
        Self {
            reply: outcome.reply,
            decision: outcome.decision,
            intent: outcome.classification.intent,
            confidence: outcome.classification.confidence,
            status: outcome.state.status(),
            turn_count: outcome.state.turn_history.len(),
            call_id: outcome.state.call_id,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EscalateRequest {
    #[serde(default)]
    pub reason: Option<String>,
}
