//! Aggregate call metrics over a time window.
//!
//! A call counts as *resolved* when it ended without being escalated.
//! Success rate is resolved calls divided by finished calls (ended or
//! escalated); calls still in progress are excluded from the ratio.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::conversation_state::{CallStatus, ConversationState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub total_calls: usize,
    pub resolved_calls: usize,
    pub escalated_calls: usize,
    pub in_progress_calls: usize,
    /// In [0, 1]; 0 when no call has finished.
    pub success_rate: f64,
    /// Share of finished calls handed to a human, in [0, 1].
    pub escalation_rate: f64,
    pub average_duration_secs: f64,
}

impl PerformanceMetrics {
    /// Aggregate calls started within `window` before `now`.
    pub fn compute<'a, I>(states: I, window: Duration, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a ConversationState>,
    {
        let window_start = now - window;
        let mut total_calls = 0usize;
        let mut resolved_calls = 0usize;
        let mut escalated_calls = 0usize;
        let mut in_progress_calls = 0usize;
        let mut total_duration_ms: i64 = 0;

        for state in states
            .into_iter()
            .filter(|s| s.created_at >= window_start && s.created_at <= now)
        {
            total_calls += 1;
            total_duration_ms += state.duration_at(now).num_milliseconds();
            if state.escalated {
                escalated_calls += 1;
            } else if state.status() == CallStatus::Ended {
                resolved_calls += 1;
            } else {
                in_progress_calls += 1;
            }
        }

        let finished = resolved_calls + escalated_calls;
        let ratio = |part: usize| {
            if finished == 0 {
                0.0
            } else {
                part as f64 / finished as f64
            }
        };
        let average_duration_secs = if total_calls == 0 {
            0.0
        } else {
            total_duration_ms as f64 / 1000.0 / total_calls as f64
        };

        Self {
            window_start,
            window_end: now,
            total_calls,
            resolved_calls,
            escalated_calls,
            in_progress_calls,
            success_rate: ratio(resolved_calls),
            escalation_rate: ratio(escalated_calls),
            average_duration_secs,
        }
    }
}
