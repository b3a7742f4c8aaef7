//! Per-call and cross-call conversation analytics.
//!
//! Everything here is derived from stored conversation state; nothing is
//! estimated. Percentages are in [0, 100] and are 0 when their
//! denominator is empty.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{CallId, ValidationError};

use super::conversation_state::{CallStatus, ConversationState};
use super::intent::Intent;
use super::scenario::Scenario;

/// Confidence at or above which a classification counts as high.
pub const HIGH_CONFIDENCE: f32 = 0.8;
/// Confidence at or above which a classification counts as medium.
pub const MEDIUM_CONFIDENCE: f32 = 0.5;

/// Analytics for a single call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallAnalytics {
    pub call_id: CallId,
    pub scenario: Scenario,
    pub status: CallStatus,
    pub total_turns: usize,
    pub caller_turns: usize,
    pub duration_secs: f64,
    /// Most recent intent, the one the call is currently about.
    pub primary_intent: Option<Intent>,
    pub intent_confidence: Option<f32>,
    pub intent_changes: usize,
    pub escalated: bool,
    pub escalation_reason: Option<String>,
}

impl CallAnalytics {
    pub fn from_state(state: &ConversationState, now: DateTime<Utc>) -> Self {
        Self {
            call_id: state.call_id.clone(),
            scenario: state.scenario,
            status: state.status(),
            total_turns: state.turn_history.len(),
            caller_turns: state.caller_turns(),
            duration_secs: state.duration_at(now).num_milliseconds() as f64 / 1000.0,
            primary_intent: state.last_intent(),
            intent_confidence: state.intent_confidence,
            intent_changes: state.intent_changes(),
            escalated: state.escalated,
            escalation_reason: state.escalation_reason.as_ref().map(|r| r.kind().to_string()),
        }
    }
}

/// Look-back period for conversation analytics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateRange {
    #[serde(rename = "1d")]
    OneDay,
    #[default]
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "30d")]
    ThirtyDays,
    #[serde(rename = "90d")]
    NinetyDays,
}

impl DateRange {
    pub const ALL: [DateRange; 4] = [
        DateRange::OneDay,
        DateRange::SevenDays,
        DateRange::ThirtyDays,
        DateRange::NinetyDays,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DateRange::OneDay => "1d",
            DateRange::SevenDays => "7d",
            DateRange::ThirtyDays => "30d",
            DateRange::NinetyDays => "90d",
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            DateRange::OneDay => Duration::days(1),
            DateRange::SevenDays => Duration::days(7),
            DateRange::ThirtyDays => Duration::days(30),
            DateRange::NinetyDays => Duration::days(90),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateRange {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        DateRange::ALL
            .into_iter()
            .find(|range| range.as_str() == normalized)
            .ok_or_else(|| ValidationError::unknown_variant("date_range", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentCount {
    pub intent: Intent,
    pub count: usize,
    pub percentage: f64,
}

/// Share of classified calls per confidence band.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBands {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationAnalytics {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub total_conversations: usize,
    pub average_turns_per_conversation: f64,
    /// Calls that ended without a human, over all calls.
    pub completion_rate: f64,
    /// Every intent recorded on every turn, most frequent first.
    pub top_intents: Vec<IntentCount>,
    pub confidence_bands: ConfidenceBands,
    pub total_escalations: usize,
    pub escalation_rate: f64,
    /// Escalated calls keyed by reason kind.
    pub escalation_reasons: BTreeMap<String, usize>,
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

impl ConversationAnalytics {
    /// Aggregate calls started within `window` before `now`, optionally
    /// restricted to one scenario.
    pub fn compute<'a, I>(
        states: I,
        scenario: Option<Scenario>,
        window: Duration,
        now: DateTime<Utc>,
    ) -> Self
    where
        I: IntoIterator<Item = &'a ConversationState>,
    {
        let window_start = now - window;
        let selected: Vec<&ConversationState> = states
            .into_iter()
            .filter(|s| s.created_at >= window_start && s.created_at <= now)
            .filter(|s| scenario.map_or(true, |wanted| s.scenario == wanted))
            .collect();

        let total = selected.len();
        let total_turns: usize = selected.iter().map(|s| s.turn_history.len()).sum();
        let completed = selected
            .iter()
            .filter(|s| s.status() == CallStatus::Ended && !s.escalated)
            .count();

        let mut intent_counts: HashMap<Intent, usize> = HashMap::new();
        for intent in selected.iter().flat_map(|s| s.intent_trail.iter()) {
            *intent_counts.entry(*intent).or_default() += 1;
        }
        let recorded: usize = intent_counts.values().sum();
        let mut top_intents: Vec<IntentCount> = intent_counts
            .into_iter()
            .map(|(intent, count)| IntentCount {
                intent,
                count,
                percentage: percentage(count, recorded),
            })
            .collect();
        top_intents.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.intent.as_str().cmp(b.intent.as_str()))
        });

        let confidences: Vec<f32> = selected.iter().filter_map(|s| s.intent_confidence).collect();
        let high = confidences.iter().filter(|c| **c >= HIGH_CONFIDENCE).count();
        let medium = confidences
            .iter()
            .filter(|c| **c >= MEDIUM_CONFIDENCE && **c < HIGH_CONFIDENCE)
            .count();
        let confidence_bands = ConfidenceBands {
            high: percentage(high, confidences.len()),
            medium: percentage(medium, confidences.len()),
            low: percentage(confidences.len() - high - medium, confidences.len()),
        };

        let mut escalation_reasons: BTreeMap<String, usize> = BTreeMap::new();
        let mut total_escalations = 0usize;
        for state in selected.iter().filter(|s| s.escalated) {
            total_escalations += 1;
            let kind = state.escalation_reason.as_ref().map_or("unspecified", |r| r.kind());
            *escalation_reasons.entry(kind.to_string()).or_default() += 1;
        }

        Self {
            window_start,
            window_end: now,
            total_conversations: total,
            average_turns_per_conversation: if total == 0 {
                0.0
            } else {
                total_turns as f64 / total as f64
            },
            completion_rate: percentage(completed, total),
            top_intents,
            confidence_bands,
            total_escalations,
            escalation_rate: percentage(total_escalations, total),
            escalation_reasons,
        }
    }
}
