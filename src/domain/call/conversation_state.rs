//! Per-call conversation state.
//!
//! Records everything said on a call, the intents detected along the way,
//! slots captured from the caller, and the call's terminal flags.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::CallId;

use super::errors::CallError;
use super::escalation::EscalationReason;
use super::intent::{Intent, IntentClassification};
use super::scenario::Scenario;
use super::utterance::Utterance;

/// Lifecycle status derived from the terminal flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    InProgress,
    Escalated,
    Ended,
}

/// Complete state of one call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationState {
    pub call_id: CallId,
    pub scenario: Scenario,
    /// Append-only, in submission order.
    pub turn_history: Vec<Utterance>,
    pub current_intent: Option<Intent>,
    /// Classifier confidence in `current_intent`.
    #[serde(default)]
    pub intent_confidence: Option<f32>,
    pub intent_trail: Vec<Intent>,
    pub slots: HashMap<String, String>,
    pub escalated: bool,
    pub escalation_reason: Option<EscalationReason>,
    pub ended: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub escalated_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl ConversationState {
    pub fn new(call_id: CallId, scenario: Scenario) -> Self {
        let now = Utc::now();
        Self {
            call_id,
            scenario,
            turn_history: Vec::new(),
            current_intent: None,
            intent_confidence: None,
            intent_trail: Vec::new(),
            slots: HashMap::new(),
            escalated: false,
            escalation_reason: None,
            ended: false,
            created_at: now,
            updated_at: now,
            escalated_at: None,
            ended_at: None,
        }
    }

    /// Append an utterance to the history. Ended calls accept nothing.
    pub fn append(&mut self, utterance: Utterance) -> Result<(), CallError> {
        if self.ended {
            return Err(CallError::CallEnded(self.call_id.clone()));
        }
        self.turn_history.push(utterance);
        self.touch();
        Ok(())
    }

    pub fn record_intent(&mut self, intent: Intent) {
        self.current_intent = Some(intent);
        self.intent_trail.push(intent);
        self.touch();
    }

    /// Record a classification, keeping its confidence alongside the intent.
    pub fn record_classification(&mut self, classification: &IntentClassification) {
        self.intent_confidence = Some(classification.confidence);
        self.record_intent(classification.intent);
    }

    pub fn set_slot(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.slots.insert(key.into(), value.into());
        self.touch();
    }

    /// Hand the call to a human. Repeat calls keep the first reason.
    pub fn mark_escalated(&mut self, reason: EscalationReason) {
        if self.escalated {
            return;
        }
        self.escalated = true;
        self.escalation_reason = Some(reason);
        self.escalated_at = Some(Utc::now());
        self.touch();
    }

    /// Terminate the call. Idempotent.
    pub fn mark_ended(&mut self) {
        if self.ended {
            return;
        }
        let now = Utc::now();
        self.ended = true;
        self.ended_at = Some(now);
        self.updated_at = now;
    }

    pub fn status(&self) -> CallStatus {
        if self.ended {
            CallStatus::Ended
        } else if self.escalated {
            CallStatus::Escalated
        } else {
            CallStatus::InProgress
        }
    }

    /// Time from call start until it ended, or until `now` if still live.
    pub fn duration_at(&self, now: DateTime<Utc>) -> Duration {
        let end = self.ended_at.unwrap_or(now);
        end.signed_duration_since(self.created_at)
            .max(Duration::zero())
    }

    pub fn last_intent(&self) -> Option<Intent> {
        self.current_intent
    }

    /// How many times the detected intent differed from the previous turn's.
    pub fn intent_changes(&self) -> usize {
        self.intent_trail.windows(2).filter(|pair| pair[0] != pair[1]).count()
    }

    pub fn caller_turns(&self) -> usize {
        self.turn_history.iter().filter(|u| u.is_caller()).count()
    }

    /// Number of `unknown` intents at the end of the intent trail.
    pub fn trailing_unknown_intents(&self) -> usize {
        self.intent_trail
            .iter()
            .rev()
            .take_while(|intent| **intent == Intent::Unknown)
            .count()
    }

    /// Check that `self` is a legal successor of `previous`.
    ///
    /// History may only grow with `previous` as a prefix, and the
    /// escalated and ended flags may never be cleared.
    pub fn validate_successor_of(&self, previous: &ConversationState) -> Result<(), String> {
        if self.call_id != previous.call_id {
            return Err("call id changed".to_string());
        }
        if self.scenario != previous.scenario {
            return Err("scenario changed".to_string());
        }
        if self.turn_history.len() < previous.turn_history.len()
            || self.turn_history[..previous.turn_history.len()] != previous.turn_history[..]
        {
            return Err("turn history is append-only".to_string());
        }
        if previous.escalated && !self.escalated {
            return Err("escalation cannot be reverted".to_string());
        }
        if previous.ended && !self.ended {
            return Err("an ended call cannot be reopened".to_string());
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_state() -> ConversationState {
        ConversationState::new(CallId::new("CA1").unwrap(), Scenario::BillingInquiry)
    }

    #[test]
    fn test_conversation_state_new() {
        let state = new_state();
        assert!(state.turn_history.is_empty());
        assert_eq!(state.status(), CallStatus::InProgress);
        assert_eq!(state.created_at, state.updated_at);
    }

    #[test]
    fn test_append_updates_timestamp() {
        let mut state = new_state();
        let before = state.updated_at;
        state.append(Utterance::caller("hello", None)).unwrap();
        assert_eq!(state.turn_history.len(), 1);
        assert!(state.updated_at >= before);
    }

    #[test]
    fn test_ended_call_rejects_append() {
        let mut state = new_state();
        state.mark_ended();
        let err = state.append(Utterance::caller("hello?", None)).unwrap_err();
        assert!(matches!(err, CallError::CallEnded(_)));
        assert!(state.turn_history.is_empty());
    }

    #[test]
    fn test_escalation_keeps_first_reason() {
        let mut state = new_state();
        state.mark_escalated(EscalationReason::CallerRequested);
        state.mark_escalated(EscalationReason::TurnLimit { history_len: 9 });
        assert_eq!(state.escalation_reason, Some(EscalationReason::CallerRequested));
        assert_eq!(state.status(), CallStatus::Escalated);
    }

    #[test]
    fn test_ended_status_wins_over_escalated() {
        let mut state = new_state();
        state.mark_escalated(EscalationReason::CallerRequested);
        state.mark_ended();
        assert_eq!(state.status(), CallStatus::Ended);
    }

    #[test]
    fn test_trailing_unknown_intents() {
        let mut state = new_state();
        state.record_intent(Intent::Unknown);
        state.record_intent(Intent::BillingQuestion);
        state.record_intent(Intent::Unknown);
        state.record_intent(Intent::Unknown);
        assert_eq!(state.trailing_unknown_intents(), 2);
        assert_eq!(state.last_intent(), Some(Intent::Unknown));
    }

    #[test]
    fn test_record_classification_keeps_confidence() {
        let mut state = new_state();
        state.record_classification(&IntentClassification::new(Intent::BillingQuestion, 0.85));
        state.record_classification(&IntentClassification::new(Intent::PaymentArrangement, 0.6));
        assert_eq!(state.current_intent, Some(Intent::PaymentArrangement));
        assert_eq!(state.intent_confidence, Some(0.6));
        assert_eq!(state.intent_trail.len(), 2);
    }

    #[test]
    fn test_intent_changes_counts_transitions() {
        let mut state = new_state();
        assert_eq!(state.intent_changes(), 0);
        for intent in [
            Intent::BillingQuestion,
            Intent::BillingQuestion,
            Intent::PaymentArrangement,
            Intent::BillingQuestion,
        ] {
            state.record_intent(intent);
        }
        assert_eq!(state.intent_changes(), 2);
    }

    #[test]
    fn test_successor_may_append() {
        let previous = new_state();
        let mut next = previous.clone();
        next.append(Utterance::caller("hi", None)).unwrap();
        assert!(next.validate_successor_of(&previous).is_ok());
    }

    #[test]
    fn test_successor_may_not_rewrite_history() {
        let mut previous = new_state();
        previous.append(Utterance::caller("hi", None)).unwrap();
        let mut next = previous.clone();
        next.turn_history[0] = Utterance::caller("bye", None);
        assert!(next.validate_successor_of(&previous).is_err());

        let mut shorter = previous.clone();
        shorter.turn_history.clear();
        assert!(shorter.validate_successor_of(&previous).is_err());
    }

    #[test]
    fn test_successor_may_not_clear_flags() {
        let mut previous = new_state();
        previous.mark_escalated(EscalationReason::CallerRequested);
        let mut next = previous.clone();
        next.escalated = false;
        assert!(next.validate_successor_of(&previous).is_err());
    }

    #[test]
    fn test_duration_uses_end_time() {
        let mut state = new_state();
        state.created_at = Utc::now() - Duration::seconds(90);
        state.mark_ended();
        let later = Utc::now() + Duration::seconds(600);
        let secs = state.duration_at(later).num_seconds();
        assert!((89..=91).contains(&secs));
    }
}
