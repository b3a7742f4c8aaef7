//! Escalation policy: decides whether a call continues, goes to a human, or ends.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::conversation_state::ConversationState;
use super::intent::Intent;

/// Spoken when a call is handed to a human agent.
pub const HANDOFF_UTTERANCE: &str =
    "I'm connecting you with a member of our billing team now. Please stay on the line.";

/// Spoken when the caller ends the call.
pub const CLOSING_UTTERANCE: &str = "Thank you for calling. Have a great day!";

/// Outcome of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationDecision {
    Continue,
    EscalateToHuman,
    EndCall,
}

impl EscalationDecision {
    /// The fixed reply for terminal decisions. `Continue` replies are generated.
    pub fn fixed_reply(&self) -> Option<&'static str> {
        match self {
            EscalationDecision::Continue => None,
            EscalationDecision::EscalateToHuman => Some(HANDOFF_UTTERANCE),
            EscalationDecision::EndCall => Some(CLOSING_UTTERANCE),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EscalationDecision::Continue => "continue",
            EscalationDecision::EscalateToHuman => "escalate_to_human",
            EscalationDecision::EndCall => "end_call",
        }
    }
}

impl fmt::Display for EscalationDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a call was handed to a human.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EscalationReason {
    CallerRequested,
    RepeatedConfusion { unknown_turns: usize },
    TurnLimit { history_len: usize },
    Manual { reason: String },
}

impl EscalationReason {
    /// The serialized `kind` tag, used to group reasons in analytics.
    pub fn kind(&self) -> &'static str {
        match self {
            EscalationReason::CallerRequested => "caller_requested",
            EscalationReason::RepeatedConfusion { .. } => "repeated_confusion",
            EscalationReason::TurnLimit { .. } => "turn_limit",
            EscalationReason::Manual { .. } => "manual",
        }
    }
}

impl fmt::Display for EscalationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EscalationReason::CallerRequested => write!(f, "caller requested a human agent"),
            EscalationReason::RepeatedConfusion { unknown_turns } => {
                write!(f, "{} consecutive turns not understood", unknown_turns)
            }
            EscalationReason::TurnLimit { history_len } => {
                write!(f, "turn limit reached ({} utterances)", history_len)
            }
            EscalationReason::Manual { reason } => write!(f, "manual escalation: {}", reason),
        }
    }
}

/// Pure decision function over conversation state.
///
/// Rules, highest priority first:
/// 1. an already escalated call stays escalated
/// 2. an explicit `escalate` intent escalates
/// 3. too many consecutive `unknown` intents escalate
/// 4. a history at the length limit escalates
/// 5. a confident `end_call` ends the call
/// 6. anything else continues
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscalationPolicy {
    pub max_consecutive_unknown: usize,
    pub max_history_len: usize,
    pub end_call_threshold: f32,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            max_consecutive_unknown: 2,
            max_history_len: 12,
            end_call_threshold: 0.7,
        }
    }
}

impl EscalationPolicy {
    pub fn new(max_consecutive_unknown: usize, max_history_len: usize, end_call_threshold: f32) -> Self {
        Self {
            max_consecutive_unknown,
            max_history_len,
            end_call_threshold,
        }
    }

    /// Decide the outcome of a turn.
    ///
    /// `state` already holds the caller's latest utterance but not yet the
    /// latest intent, which is passed separately.
    pub fn decide(&self, state: &ConversationState, latest_intent: Intent, confidence: f32) -> EscalationDecision {
        self.decide_with_reason(state, latest_intent, confidence).0
    }

    /// Like [`decide`](Self::decide), also reporting why a call escalates.
    pub fn decide_with_reason(
        &self,
        state: &ConversationState,
        latest_intent: Intent,
        confidence: f32,
    ) -> (EscalationDecision, Option<EscalationReason>) {
        if state.escalated {
            return (
                EscalationDecision::EscalateToHuman,
                state.escalation_reason.clone(),
            );
        }

        if latest_intent == Intent::Escalate {
            return (
                EscalationDecision::EscalateToHuman,
                Some(EscalationReason::CallerRequested),
            );
        }

        let unknown_turns = if latest_intent == Intent::Unknown {
            state.trailing_unknown_intents() + 1
        } else {
            0
        };
        if unknown_turns >= self.max_consecutive_unknown {
            return (
                EscalationDecision::EscalateToHuman,
                Some(EscalationReason::RepeatedConfusion { unknown_turns }),
            );
        }

        let history_len = state.turn_history.len();
        if history_len >= self.max_history_len {
            return (
                EscalationDecision::EscalateToHuman,
                Some(EscalationReason::TurnLimit { history_len }),
            );
        }

        if latest_intent == Intent::EndCall && confidence >= self.end_call_threshold {
            return (EscalationDecision::EndCall, None);
        }

        (EscalationDecision::Continue, None)
    }
}
