//! Audit trail.
//!
//! Audit events are ordinary `tracing` events on the `audit` target, so
//! the subscriber decides where they land. PHI never reaches them
//! unmasked, and caller text is reported by length only.

use crate::domain::call::{CallStatus, EscalationDecision, EscalationReason, IntentClassification, Scenario};
use crate::domain::foundation::CallId;

/// Slot keys whose values are protected health information.
pub const SENSITIVE_KEYS: &[&str] = &[
    "ssn",
    "date_of_birth",
    "medical_record_number",
    "insurance_id",
    "phone_number",
    "email",
    "address",
    "account_id",
];

pub fn is_sensitive(key: &str) -> bool {
    SENSITIVE_KEYS.contains(&key.to_ascii_lowercase().as_str())
}

/// `***` followed by the last four characters.
pub fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("***{}", tail)
}

/// Value as it may appear in logs.
pub fn loggable_value(key: &str, value: &str) -> String {
    if is_sensitive(key) {
        mask(value)
    } else {
        value.to_string()
    }
}

pub fn call_started(call_id: &CallId, scenario: Scenario) {
    tracing::info!(target: "audit", event = "call_started", call_id = %call_id, scenario = %scenario);
}

pub fn turn_handled(
    call_id: &CallId,
    caller_chars: usize,
    classification: &IntentClassification,
    decision: EscalationDecision,
    status: CallStatus,
) {
    tracing::info!(
        target: "audit",
        event = "turn_handled",
        call_id = %call_id,
        caller_chars,
        intent = %classification.intent,
        confidence = classification.confidence,
        decision = %decision,
        status = ?status,
    );
}

pub fn escalated(call_id: &CallId, reason: &EscalationReason) {
    tracing::info!(target: "audit", event = "escalated", call_id = %call_id, reason = %reason);
}

pub fn ended(call_id: &CallId) {
    tracing::info!(target: "audit", event = "ended", call_id = %call_id);
}

pub fn slot_captured(call_id: &CallId, key: &str, value: &str) {
    tracing::info!(
        target: "audit",
        event = "slot_captured",
        call_id = %call_id,
        slot = key,
        value = %loggable_value(key, value),
        phi = is_sensitive(key),
    );
}
