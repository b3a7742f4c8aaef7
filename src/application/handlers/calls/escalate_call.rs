//! EscalateCallHandler - manual transfer of a call to a human agent.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::application::orchestrator::notify_handoff;
use crate::audit;
use crate::domain::call::{CallError, ConversationState, EscalationReason};
use crate::domain::foundation::CallId;
use crate::ports::{CallControl, CallRegistry, HumanHandoff, RoutingAck, TelephonyGateway};

const DEFAULT_MANUAL_REASON: &str = "requested by operator";

#[derive(Debug, Clone)]
pub struct EscalateCallCommand {
    pub call_id: CallId,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EscalateCallResult {
    pub state: ConversationState,
    /// False when the call had already been escalated.
    pub newly_escalated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handoff: Option<RoutingAck>,
    pub transfer_sent: bool,
}

pub struct EscalateCallHandler {
    registry: Arc<dyn CallRegistry>,
    handoff: Arc<dyn HumanHandoff>,
    telephony: Arc<dyn TelephonyGateway>,
    handoff_queue: String,
    collaborator_timeout: Duration,
}

impl EscalateCallHandler {
    pub fn new(
        registry: Arc<dyn CallRegistry>,
        handoff: Arc<dyn HumanHandoff>,
        telephony: Arc<dyn TelephonyGateway>,
        handoff_queue: impl Into<String>,
        collaborator_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            handoff,
            telephony,
            handoff_queue: handoff_queue.into(),
            collaborator_timeout,
        }
    }

    pub async fn handle(&self, cmd: EscalateCallCommand) -> Result<EscalateCallResult, CallError> {
        let call_id = cmd.call_id;
        let _turn = self.registry.lock(&call_id).await?;

        let current = self.registry.get(&call_id).await?;
        if current.ended {
            return Err(CallError::CallEnded(call_id));
        }
        if current.escalated {
            return Ok(EscalateCallResult {
                state: current,
                newly_escalated: false,
                handoff: None,
                transfer_sent: false,
            });
        }

        let reason = EscalationReason::Manual {
            reason: cmd
                .reason
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| DEFAULT_MANUAL_REASON.to_string()),
        };
        audit::escalated(&call_id, &reason);
        let state = self
            .registry
            .update(&call_id, Box::new(move |s| s.mark_escalated(reason)))
            .await?;

        let handoff = notify_handoff(self.handoff.as_ref(), self.collaborator_timeout, &state).await;
        let transfer_sent = self.send_transfer(&call_id).await;

        Ok(EscalateCallResult {
            state,
            newly_escalated: true,
            handoff,
            transfer_sent,
        })
    }

    async fn send_transfer(&self, call_id: &CallId) -> bool {
        let control = CallControl::Transfer {
            queue: self.handoff_queue.clone(),
        };
        match tokio::time::timeout(self.collaborator_timeout, self.telephony.control(call_id, control)).await {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                tracing::warn!(call_id = %call_id, error = %err, "transfer control failed");
                false
            }
            Err(_) => {
                tracing::warn!(call_id = %call_id, "transfer control timed out");
                false
            }
        }
    }
}
