//! Caller intents and classification results.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// What the caller is trying to accomplish with their latest utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    BillingQuestion,
    PaymentArrangement,
    InsuranceQuestion,
    AppointmentRequest,
    Complaint,
    /// Caller explicitly asked for a person.
    Escalate,
    EndCall,
    Unknown,
}

impl Intent {
    pub const ALL: [Intent; 8] = [
        Intent::BillingQuestion,
        Intent::PaymentArrangement,
        Intent::InsuranceQuestion,
        Intent::AppointmentRequest,
        Intent::Complaint,
        Intent::Escalate,
        Intent::EndCall,
        Intent::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::BillingQuestion => "billing_question",
            Intent::PaymentArrangement => "payment_arrangement",
            Intent::InsuranceQuestion => "insurance_question",
            Intent::AppointmentRequest => "appointment_request",
            Intent::Complaint => "complaint",
            Intent::Escalate => "escalate",
            Intent::EndCall => "end_call",
            Intent::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Intent::ALL
            .into_iter()
            .find(|intent| intent.as_str() == normalized)
            .ok_or_else(|| ValidationError::unknown_variant("intent", s))
    }
}

/// Intent with the classifier's confidence in it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntentClassification {
    pub intent: Intent,
    /// Always within [0, 1].
    pub confidence: f32,
}

impl IntentClassification {
    pub fn new(intent: Intent, confidence: f32) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self { intent, confidence }
    }

    /// Result used when classification could not be performed.
    pub fn unknown() -> Self {
        Self {
            intent: Intent::Unknown,
            confidence: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_parses_loose_spellings() {
        assert_eq!("end-call".parse::<Intent>().unwrap(), Intent::EndCall);
        assert_eq!(" Billing Question ".parse::<Intent>().unwrap(), Intent::BillingQuestion);
        assert!("refund".parse::<Intent>().is_err());
    }

    #[test]
    fn classification_clamps_confidence() {
        assert_eq!(IntentClassification::new(Intent::Escalate, 1.7).confidence, 1.0);
        assert_eq!(IntentClassification::new(Intent::Escalate, -0.2).confidence, 0.0);
        assert_eq!(IntentClassification::new(Intent::Escalate, f32::NAN).confidence, 0.0);
    }

    #[test]
    fn unknown_classification_has_zero_confidence() {
        let c = IntentClassification::unknown();
        assert_eq!(c.intent, Intent::Unknown);
        assert_eq!(c.confidence, 0.0);
    }
}
