//! Speech Ports - speech-to-text and text-to-speech collaborators.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::call::CallError;

/// Errors from speech collaborators.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpeechError {
    #[error("Empty audio payload")]
    EmptyAudio,

    #[error("Unsupported audio: {0}")]
    UnsupportedAudio(String),

    #[error("Nothing to synthesize")]
    EmptyText,

    #[error("Speech service unavailable: {0}")]
    Unavailable(String),
}

impl From<SpeechError> for CallError {
    fn from(err: SpeechError) -> Self {
        CallError::Collaborator {
            collaborator: "speech",
            reason: err.to_string(),
        }
    }
}

/// Result of transcribing caller audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
    /// In [0, 1].
    pub confidence: f32,
    pub language: String,
}

/// Synthesized audio for an outbound utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesizedSpeech {
    pub audio_url: String,
    pub duration_secs: f32,
    pub voice_id: String,
    pub text_length: usize,
}

/// Converts caller audio to text.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<Transcription, SpeechError>;
}

/// Converts outbound text to audio.
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<SynthesizedSpeech, SpeechError>;
}
