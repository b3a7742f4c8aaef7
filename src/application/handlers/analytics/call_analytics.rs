//! CallAnalyticsHandler - analytics for one call.

use chrono::Utc;
use std::sync::Arc;

use crate::domain::call::{CallAnalytics, CallError};
use crate::domain::foundation::CallId;
use crate::ports::CallRegistry;

pub struct CallAnalyticsHandler {
    registry: Arc<dyn CallRegistry>,
}

impl CallAnalyticsHandler {
    pub fn new(registry: Arc<dyn CallRegistry>) -> Self {
        Self { registry }
    }

    pub async fn handle(&self, call_id: &CallId) -> Result<CallAnalytics, CallError> {
        let state = self.registry.get(call_id).await?;
        Ok(CallAnalytics::from_state(&state, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::registry::InMemoryCallRegistry;
    use crate::domain::call::{Intent, IntentClassification, Scenario, Utterance};

    #[tokio::test]
    async fn reports_stored_classification() {
        let registry = Arc::new(InMemoryCallRegistry::new());
        let id = CallId::new("CA1").unwrap();
        registry.create(id.clone(), Scenario::BillingInquiry).await.unwrap();
        registry.append_turn(&id, Utterance::caller("About my bill", None)).await.unwrap();
        registry
            .update(
                &id,
                Box::new(|s| {
                    s.record_classification(&IntentClassification::new(Intent::BillingQuestion, 0.85))
                }),
            )
            .await
            .unwrap();

        let analytics = CallAnalyticsHandler::new(registry).handle(&id).await.unwrap();

        assert_eq!(analytics.total_turns, 1);
        assert_eq!(analytics.primary_intent, Some(Intent::BillingQuestion));
        assert_eq!(analytics.intent_confidence, Some(0.85));
        assert!(!analytics.escalated);
    }

    #[tokio::test]
    async fn unknown_call_is_reported() {
        let handler = CallAnalyticsHandler::new(Arc::new(InMemoryCallRegistry::new()));
        let id = CallId::new("missing").unwrap();
        assert_eq!(handler.handle(&id).await.unwrap_err(), CallError::UnknownCall(id));
    }
}
