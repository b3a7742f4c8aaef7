//! Simulated telephony gateway.
//!
//! Records every outbound utterance and control signal in memory. A call
//! that has been hung up rejects further traffic with `NotConnected`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::foundation::CallId;
use crate::ports::{CallControl, TelephonyError, TelephonyGateway};

/// What the gateway was asked to do.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelephonyEventKind {
    Utterance { text: String },
    Control { control: CallControl },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelephonyEvent {
    pub call_id: CallId,
    pub kind: TelephonyEventKind,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Inner {
    events: Vec<TelephonyEvent>,
    hung_up: HashSet<CallId>,
}

#[derive(Debug, Clone, Default)]
pub struct SimulatedTelephonyGateway {
    inner: Arc<Mutex<Inner>>,
}

impl SimulatedTelephonyGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<TelephonyEvent> {
        self.inner.lock().await.events.clone()
    }

    pub async fn events_for(&self, call_id: &CallId) -> Vec<TelephonyEvent> {
        self.inner
            .lock()
            .await
            .events
            .iter()
            .filter(|e| &e.call_id == call_id)
            .cloned()
            .collect()
    }

    fn record(inner: &mut Inner, call_id: &CallId, kind: TelephonyEventKind) -> Result<(), TelephonyError> {
        if inner.hung_up.contains(call_id) {
            return Err(TelephonyError::NotConnected(call_id.clone()));
        }
        inner.events.push(TelephonyEvent {
            call_id: call_id.clone(),
            kind,
            at: Utc::now(),
        });
        Ok(())
    }
}

#[async_trait]
impl TelephonyGateway for SimulatedTelephonyGateway {
    async fn send_utterance(&self, call_id: &CallId, text: &str) -> Result<(), TelephonyError> {
        let mut inner = self.inner.lock().await;
        Self::record(
            &mut inner,
            call_id,
            TelephonyEventKind::Utterance {
                text: text.to_string(),
            },
        )?;
        tracing::debug!(call_id = %call_id, chars = text.len(), "utterance sent");
        Ok(())
    }

    async fn control(&self, call_id: &CallId, control: CallControl) -> Result<(), TelephonyError> {
        let mut inner = self.inner.lock().await;
        let hangup = control == CallControl::Hangup;
        Self::record(&mut inner, call_id, TelephonyEventKind::Control { control })?;
        if hangup {
            inner.hung_up.insert(call_id.clone());
        }
        tracing::debug!(call_id = %call_id, hangup, "call control sent");
        Ok(())
    }
}
