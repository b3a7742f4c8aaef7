//! ProcessAudioHandler - one turn from caller audio to spoken reply.
//!
//! transcribe -> handle turn -> synthesize -> speak, then transfer or hang
//! up when the turn escalated or ended the call.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::application::orchestrator::TurnOrchestrator;
use crate::application::retry::RetryPolicy;
use crate::domain::call::{CallError, CallStatus, EscalationDecision, Intent};
use crate::domain::foundation::CallId;
use crate::ports::{
    CallControl, SpeechToText, SynthesizedSpeech, TelephonyGateway, TextToSpeech, Transcription,
};

#[derive(Debug, Clone)]
pub struct ProcessAudioCommand {
    pub call_id: CallId,
    pub audio: Vec<u8>,
    pub voice_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessAudioResult {
    pub call_id: CallId,
    pub transcription: Transcription,
    pub reply: String,
    pub decision: EscalationDecision,
    pub intent: Intent,
    pub confidence: f32,
    pub status: CallStatus,
    /// Missing when synthesis failed; the turn itself still counts.
    pub audio: Option<SynthesizedSpeech>,
    /// The reply was handed to the telephony gateway.
    pub delivered: bool,
}

/// Collaborators and settings for the audio path.
pub struct VoicePipeline {
    pub stt: Arc<dyn SpeechToText>,
    pub tts: Arc<dyn TextToSpeech>,
    pub telephony: Arc<dyn TelephonyGateway>,
    pub default_voice_id: String,
    pub handoff_queue: String,
    pub collaborator_timeout: Duration,
}

pub struct ProcessAudioHandler {
    orchestrator: Arc<TurnOrchestrator>,
    pipeline: VoicePipeline,
}

impl ProcessAudioHandler {
    pub fn new(orchestrator: Arc<TurnOrchestrator>, pipeline: VoicePipeline) -> Self {
        Self {
            orchestrator,
            pipeline,
        }
    }

    pub async fn handle(&self, cmd: ProcessAudioCommand) -> Result<ProcessAudioResult, CallError> {
        let call_id = cmd.call_id;
        let policy = RetryPolicy::no_retry(self.pipeline.collaborator_timeout);

        let transcription = policy
            .run("transcription", |_| self.pipeline.stt.transcribe(&cmd.audio))
            .await?;

        let outcome = self
            .orchestrator
            .handle_turn(&call_id, &transcription.text, Some(transcription.confidence))
            .await?;

        let voice_id = cmd
            .voice_id
            .unwrap_or_else(|| self.pipeline.default_voice_id.clone());
        let audio = match policy
            .run("synthesis", |_| self.pipeline.tts.synthesize(&outcome.reply, &voice_id))
            .await
        {
            Ok(audio) => Some(audio),
            Err(err) => {
                tracing::warn!(call_id = %call_id, error = %err, "reply synthesis failed");
                None
            }
        };

        let delivered = match policy
            .run("send_utterance", |_| self.pipeline.telephony.send_utterance(&call_id, &outcome.reply))
            .await
        {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(call_id = %call_id, error = %err, "reply delivery failed");
                false
            }
        };

        let control = match outcome.decision {
            EscalationDecision::EscalateToHuman if outcome.newly_escalated => Some(CallControl::Transfer {
                queue: self.pipeline.handoff_queue.clone(),
            }),
            EscalationDecision::EndCall => Some(CallControl::Hangup),
            _ => None,
        };
        if let Some(control) = control {
            if let Err(err) = policy
                .run("call_control", |_| self.pipeline.telephony.control(&call_id, control.clone()))
                .await
            {
                tracing::warn!(call_id = %call_id, error = %err, "call control failed");
            }
        }

        Ok(ProcessAudioResult {
            call_id,
            transcription,
            reply: outcome.reply,
            decision: outcome.decision,
            intent: outcome.classification.intent,
            confidence: outcome.classification.confidence,
            status: outcome.state.status(),
            audio,
            delivered,
        })
    }
}
