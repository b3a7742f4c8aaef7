//! ConversationAnalyticsHandler - intents, turns and escalations across calls.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use crate::domain::call::{CallError, ConversationAnalytics, DateRange, Scenario};
use crate::ports::CallRegistry;

/// Raw query parameters; both are validated by the handler.
#[derive(Debug, Clone, Default)]
pub struct ConversationAnalyticsQuery {
    pub scenario: Option<String>,
    pub date_range: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationAnalyticsReport {
    pub date_range: DateRange,
    pub scenario_filter: Option<Scenario>,
    #[serde(flatten)]
    pub analytics: ConversationAnalytics,
}

pub struct ConversationAnalyticsHandler {
    registry: Arc<dyn CallRegistry>,
}

impl ConversationAnalyticsHandler {
    pub fn new(registry: Arc<dyn CallRegistry>) -> Self {
        Self { registry }
    }

    pub async fn handle(
        &self,
        query: ConversationAnalyticsQuery,
    ) -> Result<ConversationAnalyticsReport, CallError> {
        let scenario = query
            .scenario
            .as_deref()
            .map(|tag| {
                tag.parse::<Scenario>()
                    .map_err(|_| CallError::UnknownScenario(tag.to_string()))
            })
            .transpose()?;
        let date_range = match query.date_range.as_deref() {
            Some(raw) => raw.parse::<DateRange>()?,
            None => DateRange::default(),
        };

        let states = self.registry.list().await?;
        let analytics = ConversationAnalytics::compute(&states, scenario, date_range.duration(), Utc::now());
        tracing::debug!(
            date_range = %date_range,
            conversations = analytics.total_conversations,
            "conversation analytics computed"
        );

        Ok(ConversationAnalyticsReport {
            date_range,
            scenario_filter: scenario,
            analytics,
        })
    }
}
