//! PerformanceMetricsHandler - aggregate outcomes over a recent window.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use crate::domain::call::{CallError, PerformanceMetrics};
use crate::domain::foundation::ValidationError;
use crate::ports::CallRegistry;

pub const DEFAULT_WINDOW_MINUTES: u32 = 1440;

#[derive(Debug, Clone, Copy)]
pub struct PerformanceMetricsQuery {
    pub window_minutes: u32,
}

impl Default for PerformanceMetricsQuery {
    fn default() -> Self {
        Self {
            window_minutes: DEFAULT_WINDOW_MINUTES,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceReport {
    pub window_minutes: u32,
    #[serde(flatten)]
    pub metrics: PerformanceMetrics,
}

pub struct PerformanceMetricsHandler {
    registry: Arc<dyn CallRegistry>,
}

impl PerformanceMetricsHandler {
    pub fn new(registry: Arc<dyn CallRegistry>) -> Self {
        Self { registry }
    }

    pub async fn handle(&self, query: PerformanceMetricsQuery) -> Result<PerformanceReport, CallError> {
        if query.window_minutes == 0 {
            return Err(ValidationError::invalid_format("window_minutes", "must be at least 1").into());
        }

        let states = self.registry.list().await?;
        let window = chrono::Duration::minutes(i64::from(query.window_minutes));
        Ok(PerformanceReport {
            window_minutes: query.window_minutes,
            metrics: PerformanceMetrics::compute(&states, window, Utc::now()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::registry::InMemoryCallRegistry;
    use crate::domain::call::{EscalationReason, Scenario};
    use crate::domain::foundation::CallId;

    #[tokio::test]
    async fn success_rate_is_resolved_over_finished() {
        let registry = Arc::new(InMemoryCallRegistry::new());
        for id in ["CA1", "CA2", "CA3", "CA4"] {
            registry.create(CallId::new(id).unwrap(), Scenario::BillingInquiry).await.unwrap();
        }
        for id in ["CA1", "CA2"] {
            registry.update(&CallId::new(id).unwrap(), Box::new(|s| s.mark_ended())).await.unwrap();
        }
        registry
            .update(
                &CallId::new("CA3").unwrap(),
                Box::new(|s| s.mark_escalated(EscalationReason::CallerRequested)),
            )
            .await
            .unwrap();

        let report = PerformanceMetricsHandler::new(registry)
            .handle(PerformanceMetricsQuery::default())
            .await
            .unwrap();

        assert_eq!(report.window_minutes, 1440);
        assert_eq!(report.metrics.total_calls, 4);
        assert_eq!(report.metrics.resolved_calls, 2);
        assert_eq!(report.metrics.escalated_calls, 1);
        assert_eq!(report.metrics.in_progress_calls, 1);
        assert!((report.metrics.success_rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn zero_window_is_rejected() {
        let handler = PerformanceMetricsHandler::new(Arc::new(InMemoryCallRegistry::new()));
        let err = handler.handle(PerformanceMetricsQuery { window_minutes: 0 }).await.unwrap_err();
        assert!(matches!(err, CallError::Validation(_)));
    }
}
