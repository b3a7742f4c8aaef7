//! Telephony Port - outbound speech and call control.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::call::CallError;
use crate::domain::foundation::CallId;

/// Call-control signal sent to the telephony provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CallControl {
    Hold,
    /// Route the call to a human agent queue.
    Transfer { queue: String },
    Hangup,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TelephonyError {
    #[error("Call {0} is not connected")]
    NotConnected(CallId),

    #[error("Telephony provider unavailable: {0}")]
    Unavailable(String),
}

impl From<TelephonyError> for CallError {
    fn from(err: TelephonyError) -> Self {
        CallError::Collaborator {
            collaborator: "telephony",
            reason: err.to_string(),
        }
    }
}

/// Port for the telephony collaborator.
#[async_trait]
pub trait TelephonyGateway: Send + Sync {
    /// Speak `text` to the caller.
    async fn send_utterance(&self, call_id: &CallId, text: &str) -> Result<(), TelephonyError>;

    async fn control(&self, call_id: &CallId, control: CallControl) -> Result<(), TelephonyError>;
}
