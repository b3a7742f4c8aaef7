//! Domain services for the call domain
//!
//! The intent classifier seam, plus the deterministic keyword classifier.

use async_trait::async_trait;

use super::intent::{Intent, IntentClassification};
use super::utterance::Utterance;
use crate::domain::foundation::CallId;

/// Classifies what the caller wants from the conversation so far.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Classify the latest caller utterance in `turn_history`.
    ///
    /// `call_id` is for correlation only. Implementations never fail: when
    /// classification cannot be performed they return
    /// [`IntentClassification::unknown`].
    async fn classify(&self, call_id: &CallId, turn_history: &[Utterance]) -> IntentClassification;
}

/// Keyword rules, checked in order; the first match wins.
const RULES: &[(Intent, f32, &[&str])] = &[
    (
        Intent::Escalate,
        0.95,
        &[
            "human",
            "agent",
            "representative",
            "operator",
            "supervisor",
            "manager",
            "real person",
        ],
    ),
    (
        Intent::EndCall,
        0.9,
        &[
            "goodbye",
            "bye",
            "that's all",
            "that is all",
            "hang up",
            "no more questions",
        ],
    ),
    (
        Intent::PaymentArrangement,
        0.85,
        &["payment plan", "installment", "pay over time", "arrangement"],
    ),
    (
        Intent::BillingQuestion,
        0.85,
        &["bill", "charge", "payment", "cost", "balance", "invoice", "owe"],
    ),
    (
        Intent::InsuranceQuestion,
        0.8,
        &["insurance", "coverage", "benefit", "deductible", "copay", "claim"],
    ),
    (
        Intent::AppointmentRequest,
        0.8,
        &["appointment", "schedule", "booking", "reschedule"],
    ),
    (
        Intent::Complaint,
        0.75,
        &["complaint", "dispute", "problem", "issue", "wrong"],
    ),
];

/// Deterministic keyword classifier over the latest caller utterance.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordIntentClassifier;

impl KeywordIntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a single piece of caller text.
    pub fn classify_text(&self, text: &str) -> IntentClassification {
        let lowercase = text.to_lowercase();
        let words: Vec<&str> = lowercase
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|w| !w.is_empty())
            .collect();

        RULES
            .iter()
            .find(|(_, _, keywords)| {
                keywords
                    .iter()
                    .any(|keyword| matches_keyword(&lowercase, &words, keyword))
            })
            .map(|(intent, confidence, _)| IntentClassification::new(*intent, *confidence))
            .unwrap_or_else(IntentClassification::unknown)
    }
}

/// Phrases match as substrings; single words match word prefixes
/// so "bills" and "charged" count but "tissue" does not.
fn matches_keyword(text: &str, words: &[&str], keyword: &str) -> bool {
    if keyword.contains(' ') || keyword.contains('\'') {
        text.contains(keyword)
    } else {
        words.iter().any(|word| word.starts_with(keyword))
    }
}

#[async_trait]
impl IntentClassifier for KeywordIntentClassifier {
    async fn classify(&self, _call_id: &CallId, turn_history: &[Utterance]) -> IntentClassification {
        match turn_history.iter().rev().find(|u| u.is_caller()) {
            Some(latest) => self.classify_text(&latest.text),
            None => IntentClassification::unknown(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call_id() -> CallId {
        CallId::new("CA-classify").unwrap()
    }

    fn intent_of(text: &str) -> Intent {
        KeywordIntentClassifier.classify_text(text).intent
    }

    #[test]
    fn test_classify_billing_questions() {
        assert_eq!(intent_of("I have a question about my bill"), Intent::BillingQuestion);
        assert_eq!(intent_of("Can you explain the $200 charge?"), Intent::BillingQuestion);
        assert_eq!(intent_of("How much do I owe?"), Intent::BillingQuestion);
    }

    #[test]
    fn test_payment_plan_beats_billing() {
        assert_eq!(intent_of("I'd like a payment plan"), Intent::PaymentArrangement);
    }

    #[test]
    fn test_classify_escalation_requests() {
        assert_eq!(intent_of("I want to talk to a human"), Intent::Escalate);
        assert_eq!(intent_of("Let me speak with a real person about this bill"), Intent::Escalate);
    }

    #[test]
    fn test_classify_end_call() {
        assert_eq!(intent_of("That's all, thanks. Goodbye!"), Intent::EndCall);
    }

    #[test]
    fn test_other_scenarios() {
        assert_eq!(intent_of("Is my MRI covered by my insurance?"), Intent::InsuranceQuestion);
        assert_eq!(intent_of("I need to reschedule my appointment"), Intent::AppointmentRequest);
        assert_eq!(intent_of("There's a problem with my statement"), Intent::Complaint);
    }

    #[test]
    fn test_word_prefix_matching_avoids_inner_matches() {
        assert_eq!(intent_of("My tissue sample results"), Intent::Unknown);
        assert_eq!(intent_of("Why was I charged twice"), Intent::BillingQuestion);
    }

    #[test]
    fn test_unmatched_text_is_unknown_with_zero_confidence() {
        let c = KeywordIntentClassifier.classify_text("purple monkey dishwasher");
        assert_eq!(c, IntentClassification::unknown());
    }

    #[tokio::test]
    async fn test_classify_uses_latest_caller_utterance() {
        let history = vec![
            Utterance::caller("I have a question about my bill", None),
            Utterance::system("Sure, what would you like to know?"),
            Utterance::caller("I want to talk to a human", None),
            Utterance::system("One moment."),
        ];
        let result = KeywordIntentClassifier.classify(&call_id(), &history).await;
        assert_eq!(result.intent, Intent::Escalate);
        assert!((result.confidence - 0.95).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_empty_history_is_unknown() {
        let result = KeywordIntentClassifier.classify(&call_id(), &[]).await;
        assert_eq!(result.intent, Intent::Unknown);
    }
}
