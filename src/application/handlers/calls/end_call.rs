//! EndCallHandler - retires a call.
//!
//! Marks the call ended and hangs up. Ended calls stay readable.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::audit;
use crate::domain::call::{CallError, ConversationState};
use crate::domain::foundation::CallId;
use crate::ports::{CallControl, CallRegistry, TelephonyGateway};

#[derive(Debug, Clone)]
pub struct EndCallCommand {
    pub call_id: CallId,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndCallResult {
    pub state: ConversationState,
    pub hangup_sent: bool,
}

pub struct EndCallHandler {
    registry: Arc<dyn CallRegistry>,
    telephony: Arc<dyn TelephonyGateway>,
    collaborator_timeout: Duration,
}

impl EndCallHandler {
    pub fn new(
        registry: Arc<dyn CallRegistry>,
        telephony: Arc<dyn TelephonyGateway>,
        collaborator_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            telephony,
            collaborator_timeout,
        }
    }

    pub async fn handle(&self, cmd: EndCallCommand) -> Result<EndCallResult, CallError> {
        let call_id = cmd.call_id;
        let _turn = self.registry.lock(&call_id).await?;

        // update rejects an already ended call with CallEnded
        let state = self
            .registry
            .update(&call_id, Box::new(|s| s.mark_ended()))
            .await?;
        audit::ended(&call_id);

        let hangup_sent = match tokio::time::timeout(
            self.collaborator_timeout,
            self.telephony.control(&call_id, CallControl::Hangup),
        )
        .await
        {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                tracing::warn!(call_id = %call_id, error = %err, "hangup failed");
                false
            }
            Err(_) => {
                tracing::warn!(call_id = %call_id, "hangup timed out");
                false
            }
        };

        Ok(EndCallResult { state, hangup_sent })
    }
}
