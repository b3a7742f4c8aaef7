//! Handoff summary for the human agent taking over a call.

use serde::{Deserialize, Serialize};

use super::conversation_state::{CallStatus, ConversationState};
use super::intent::Intent;
use super::scenario::Scenario;

/// Caller utterances quoted in a summary.
const HIGHLIGHT_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandoffSummary {
    pub scenario: Scenario,
    pub status: CallStatus,
    /// Caller utterances so far.
    pub total_turns: usize,
    pub last_intent: Option<Intent>,
    /// Distinct intents in the order first detected.
    pub key_topics: Vec<Intent>,
    pub escalation_reason: Option<String>,
    /// Slot names captured; values are left out of the summary.
    pub captured_slots: Vec<String>,
    /// Latest caller utterances, oldest first.
    pub transcript_highlights: Vec<String>,
    pub recommended_actions: Vec<String>,
}

impl HandoffSummary {
    pub fn from_state(state: &ConversationState) -> Self {
        let mut key_topics: Vec<Intent> = Vec::new();
        for intent in &state.intent_trail {
            if *intent != Intent::Unknown && !key_topics.contains(intent) {
                key_topics.push(*intent);
            }
        }

        let mut highlights: Vec<String> = state
            .turn_history
            .iter()
            .rev()
            .filter(|u| u.is_caller())
            .take(HIGHLIGHT_COUNT)
            .map(|u| u.text.clone())
            .collect();
        highlights.reverse();

        let mut captured_slots: Vec<String> = state.slots.keys().cloned().collect();
        captured_slots.sort();

        Self {
            scenario: state.scenario,
            status: state.status(),
            total_turns: state.caller_turns(),
            last_intent: state.last_intent(),
            key_topics,
            escalation_reason: state.escalation_reason.as_ref().map(|r| r.to_string()),
            captured_slots,
            transcript_highlights: highlights,
            recommended_actions: recommended_actions(state),
        }
    }
}

fn recommended_actions(state: &ConversationState) -> Vec<String> {
    if !state.escalated {
        return Vec::new();
    }
    let mut actions = vec![
        "Review conversation history".to_string(),
        "Verify patient identity".to_string(),
    ];
    if state.intent_trail.contains(&Intent::PaymentArrangement) {
        actions.push("Discuss payment arrangement options".to_string());
    }
    if state.intent_trail.contains(&Intent::Complaint) {
        actions.push("Log the complaint and confirm follow-up".to_string());
    }
    if state.trailing_unknown_intents() > 0 {
        actions.push("Clarify what the caller needs".to_string());
    }
    actions.push("Address specific concerns".to_string());
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::call::{EscalationReason, Utterance};
    use crate::domain::foundation::CallId;

    fn escalated_state() -> ConversationState {
        let mut state = ConversationState::new(CallId::new("CA9").unwrap(), Scenario::BillingInquiry);
        for text in ["my bill is wrong", "payment plan please", "get me a human"] {
            state.append(Utterance::caller(text, None)).unwrap();
            state.append(Utterance::system("ok")).unwrap();
        }
        state.record_intent(Intent::BillingQuestion);
        state.record_intent(Intent::PaymentArrangement);
        state.record_intent(Intent::BillingQuestion);
        state.record_intent(Intent::Escalate);
        state.set_slot("account_id", "1234567");
        state.mark_escalated(EscalationReason::CallerRequested);
        state
    }

    #[test]
    fn summary_lists_distinct_topics_in_order() {
        let summary = HandoffSummary::from_state(&escalated_state());
        assert_eq!(
            summary.key_topics,
            vec![Intent::BillingQuestion, Intent::PaymentArrangement, Intent::Escalate]
        );
        assert_eq!(summary.total_turns, 3);
        assert_eq!(summary.status, CallStatus::Escalated);
    }

    #[test]
    fn summary_omits_slot_values() {
        let summary = HandoffSummary::from_state(&escalated_state());
        assert_eq!(summary.captured_slots, vec!["account_id".to_string()]);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("1234567"));
    }

    #[test]
    fn escalated_summary_recommends_actions() {
        let summary = HandoffSummary::from_state(&escalated_state());
        assert!(summary
            .recommended_actions
            .contains(&"Discuss payment arrangement options".to_string()));
        assert_eq!(
            summary.escalation_reason.as_deref(),
            Some("caller requested a human agent")
        );
        assert_eq!(summary.transcript_highlights.len(), 3);
        assert_eq!(summary.transcript_highlights[2], "get me a human");
    }

    #[test]
    fn live_call_has_no_recommendations() {
        let state = ConversationState::new(CallId::new("CA10").unwrap(), Scenario::AppointmentScheduling);
        let summary = HandoffSummary::from_state(&state);
        assert!(summary.recommended_actions.is_empty());
        assert!(summary.transcript_highlights.is_empty());
    }
}
