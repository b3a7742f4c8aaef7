//! ListActiveCallsHandler - dashboard view of calls that have not ended.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::call::{CallError, CallStatus, Intent, Scenario};
use crate::domain::foundation::CallId;
use crate::ports::CallRegistry;

#[derive(Debug, Clone, Serialize)]
pub struct ActiveCallView {
    pub call_id: CallId,
    pub scenario: Scenario,
    pub status: CallStatus,
    pub duration_secs: i64,
    pub last_intent: Option<Intent>,
    /// Running longer than the configured maximum call duration.
    pub overdue: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActiveCallsView {
    pub active_calls: Vec<ActiveCallView>,
    pub total: usize,
}

pub struct ListActiveCallsHandler {
    registry: Arc<dyn CallRegistry>,
    max_call_duration: Duration,
}

impl ListActiveCallsHandler {
    pub fn new(registry: Arc<dyn CallRegistry>, max_call_duration: Duration) -> Self {
        Self {
            registry,
            max_call_duration,
        }
    }

    pub async fn handle(&self) -> Result<ActiveCallsView, CallError> {
        let now = Utc::now();
        let limit = self.max_call_duration.as_secs() as i64;

        let active_calls: Vec<ActiveCallView> = self
            .registry
            .list()
            .await?
            .into_iter()
            .filter(|state| !state.ended)
            .map(|state| {
                let duration_secs = state.duration_at(now).num_seconds();
                ActiveCallView {
                    status: state.status(),
                    last_intent: state.last_intent(),
                    overdue: duration_secs > limit,
                    call_id: state.call_id,
                    scenario: state.scenario,
                    duration_secs,
                }
            })
            .collect();

        Ok(ActiveCallsView {
            total: active_calls.len(),
            active_calls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::registry::InMemoryCallRegistry;
    use crate::domain::call::EscalationReason;

    #[tokio::test]
    async fn lists_only_calls_that_have_not_ended() {
        let registry = Arc::new(InMemoryCallRegistry::new());
        for id in ["CA1", "CA2", "CA3"] {
            registry.create(CallId::new(id).unwrap(), Scenario::BillingInquiry).await.unwrap();
        }
        let ended = CallId::new("CA2").unwrap();
        registry.update(&ended, Box::new(|s| s.mark_ended())).await.unwrap();
        let escalated = CallId::new("CA3").unwrap();
        registry
            .update(
                &escalated,
                Box::new(|s| s.mark_escalated(EscalationReason::CallerRequested)),
            )
            .await
            .unwrap();

        let view = ListActiveCallsHandler::new(registry, Duration::from_secs(1800))
            .handle()
            .await
            .unwrap();

        assert_eq!(view.total, 2);
        let mut ids: Vec<&str> = view.active_calls.iter().map(|c| c.call_id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["CA1", "CA3"]);
        let escalated_view = view.active_calls.iter().find(|c| c.call_id == escalated).unwrap();
        assert_eq!(escalated_view.status, CallStatus::Escalated);
        assert!(view.active_calls.iter().all(|c| !c.overdue));
    }

    #[tokio::test]
    async fn zero_limit_flags_running_calls_as_overdue() {
        let registry = Arc::new(InMemoryCallRegistry::new());
        registry.create(CallId::new("CA1").unwrap(), Scenario::BillingInquiry).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

        let view = ListActiveCallsHandler::new(registry, Duration::ZERO).handle().await.unwrap();
        assert!(view.active_calls[0].overdue);
    }
}
