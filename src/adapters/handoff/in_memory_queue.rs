//! In-memory human handoff queue.
//!
//! Stands in for a contact-center routing API: every request is queued
//! and acknowledged with its 1-based position.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::foundation::CallId;
use crate::ports::{HandoffError, HandoffRequest, HumanHandoff, RoutingAck};

#[derive(Debug, Clone)]
pub struct InMemoryHandoffQueue {
    queue_name: String,
    capacity: Option<usize>,
    pending: Arc<Mutex<Vec<HandoffRequest>>>,
}

impl InMemoryHandoffQueue {
    pub fn new(queue_name: impl Into<String>) -> Self {
        Self {
            queue_name: queue_name.into(),
            capacity: None,
            pending: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reject handoffs once `capacity` requests are waiting.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub async fn pending(&self) -> Vec<HandoffRequest> {
        self.pending.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pending.lock().await.is_empty()
    }

    /// An agent picks up the call.
    pub async fn dequeue(&self, call_id: &CallId) -> Option<HandoffRequest> {
        let mut pending = self.pending.lock().await;
        let index = pending.iter().position(|r| &r.call_id == call_id)?;
        Some(pending.remove(index))
    }
}

impl Default for InMemoryHandoffQueue {
    fn default() -> Self {
        Self::new("healthcare_support")
    }
}

#[async_trait]
impl HumanHandoff for InMemoryHandoffQueue {
    async fn request_handoff(&self, request: HandoffRequest) -> Result<RoutingAck, HandoffError> {
        let mut pending = self.pending.lock().await;

        if let Some(existing) = pending.iter().position(|r| r.call_id == request.call_id) {
            return Ok(RoutingAck {
                call_id: request.call_id,
                agent_queue: self.queue_name.clone(),
                position: existing + 1,
                acknowledged_at: Utc::now(),
            });
        }
        if self.capacity.is_some_and(|cap| pending.len() >= cap) {
            return Err(HandoffError::NoAgentsAvailable(self.queue_name.clone()));
        }

        let call_id = request.call_id.clone();
        pending.push(request);
        Ok(RoutingAck {
            call_id,
            agent_queue: self.queue_name.clone(),
            position: pending.len(),
            acknowledged_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::call::{ConversationState, HandoffSummary, Scenario};

    fn request(id: &str) -> HandoffRequest {
        let state = ConversationState::new(CallId::new(id).unwrap(), Scenario::BillingInquiry);
        HandoffRequest {
            call_id: state.call_id.clone(),
            scenario: state.scenario,
            reason: None,
            turn_history: Vec::new(),
            summary: HandoffSummary::from_state(&state),
        }
    }

    #[tokio::test]
    async fn acknowledges_with_queue_position() {
        let queue = InMemoryHandoffQueue::default();
        let first = queue.request_handoff(request("CA1")).await.unwrap();
        let second = queue.request_handoff(request("CA2")).await.unwrap();

        assert_eq!(first.agent_queue, "healthcare_support");
        assert_eq!(first.position, 1);
        assert_eq!(second.position, 2);
        assert_eq!(queue.len().await, 2);
    }

    #[tokio::test]
    async fn repeated_request_keeps_position() {
        let queue = InMemoryHandoffQueue::default();
        queue.request_handoff(request("CA1")).await.unwrap();
        let again = queue.request_handoff(request("CA1")).await.unwrap();

        assert_eq!(again.position, 1);
        assert_eq!(queue.len().await, 1);
    }

    #[tokio::test]
    async fn full_queue_rejects() {
        let queue = InMemoryHandoffQueue::default().with_capacity(1);
        queue.request_handoff(request("CA1")).await.unwrap();

        let err = queue.request_handoff(request("CA2")).await.unwrap_err();
        assert_eq!(err, HandoffError::NoAgentsAvailable("healthcare_support".into()));
    }

    #[tokio::test]
    async fn dequeue_removes_request() {
        let queue = InMemoryHandoffQueue::default();
        queue.request_handoff(request("CA1")).await.unwrap();

        assert!(queue.dequeue(&CallId::new("CA1").unwrap()).await.is_some());
        assert!(queue.is_empty().await);
    }
}
