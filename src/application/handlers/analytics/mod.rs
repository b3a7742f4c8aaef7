//! Analytics query handlers.

mod call_analytics;
mod conversation_analytics;
mod performance_metrics;

pub use call_analytics::CallAnalyticsHandler;
pub use conversation_analytics::{
    ConversationAnalyticsHandler, ConversationAnalyticsQuery, ConversationAnalyticsReport,
};
pub use performance_metrics::{
    PerformanceMetricsHandler, PerformanceMetricsQuery, PerformanceReport, DEFAULT_WINDOW_MINUTES,
};
