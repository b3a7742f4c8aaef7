//! Call state, transcript and handoff summary queries.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::call::{CallError, ConversationState, HandoffSummary, Utterance};
use crate::domain::foundation::CallId;
use crate::ports::CallRegistry;

/// Ordered transcript of one call.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptView {
    pub call_id: CallId,
    pub transcript: Vec<Utterance>,
    pub total_turns: usize,
}

impl From<ConversationState> for TranscriptView {
    fn from(state: ConversationState) -> Self {
        Self {
            call_id: state.call_id,
            total_turns: state.turn_history.len(),
            transcript: state.turn_history,
        }
    }
}

/// Read-only access to individual calls.
pub struct GetCallHandler {
    registry: Arc<dyn CallRegistry>,
}

impl GetCallHandler {
    pub fn new(registry: Arc<dyn CallRegistry>) -> Self {
        Self { registry }
    }

    pub async fn state(&self, call_id: &CallId) -> Result<ConversationState, CallError> {
        Ok(self.registry.get(call_id).await?)
    }

    pub async fn transcript(&self, call_id: &CallId) -> Result<TranscriptView, CallError> {
        self.state(call_id).await.map(TranscriptView::from)
    }

    pub async fn summary(&self, call_id: &CallId) -> Result<HandoffSummary, CallError> {
        let state = self.state(call_id).await?;
        Ok(HandoffSummary::from_state(&state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::registry::InMemoryCallRegistry;
    use crate::domain::call::{CallStatus, Scenario};

    async fn setup() -> (GetCallHandler, CallId) {
        let registry = Arc::new(InMemoryCallRegistry::new());
        let id = CallId::new("CA1").unwrap();
        registry.create(id.clone(), Scenario::BillingInquiry).await.unwrap();
        registry.append_turn(&id, Utterance::caller("Hi, about my bill", None)).await.unwrap();
        registry.append_turn(&id, Utterance::system("Happy to help.")).await.unwrap();
        (GetCallHandler::new(registry), id)
    }

    #[tokio::test]
    async fn reads_are_idempotent() {
        let (handler, id) = setup().await;
        assert_eq!(handler.state(&id).await.unwrap(), handler.state(&id).await.unwrap());
    }

    #[tokio::test]
    async fn transcript_lists_turns_in_order() {
        let (handler, id) = setup().await;
        let view = handler.transcript(&id).await.unwrap();
        assert_eq!(view.total_turns, 2);
        assert_eq!(view.transcript[0].text, "Hi, about my bill");
    }

    #[tokio::test]
    async fn summary_reflects_state() {
        let (handler, id) = setup().await;
        let summary = handler.summary(&id).await.unwrap();
        assert_eq!(summary.status, CallStatus::InProgress);
        assert_eq!(summary.total_turns, 1);
    }

    #[tokio::test]
    async fn unknown_call_is_reported() {
        let (handler, _) = setup().await;
        let missing = CallId::new("CA404").unwrap();
        assert_eq!(handler.state(&missing).await.unwrap_err(), CallError::UnknownCall(missing));
    }
}
