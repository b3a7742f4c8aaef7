//! Recorded utterances.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::UtteranceId;

/// Who spoke an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Caller,
    System,
}

/// One thing said on the call. Never modified once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub id: UtteranceId,
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Transcription confidence in [0, 1], when speech recognition produced the text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl Utterance {
    pub fn caller(text: impl Into<String>, confidence: Option<f32>) -> Self {
        Self::new(Speaker::Caller, text.into(), confidence)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Speaker::System, text.into(), None)
    }

    fn new(speaker: Speaker, text: String, confidence: Option<f32>) -> Self {
        Self {
            id: UtteranceId::new(),
            speaker,
            text,
            timestamp: Utc::now(),
            confidence: confidence
                .filter(|c| !c.is_nan())
                .map(|c| c.clamp(0.0, 1.0)),
        }
    }

    pub fn is_caller(&self) -> bool {
        self.speaker == Speaker::Caller
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}
