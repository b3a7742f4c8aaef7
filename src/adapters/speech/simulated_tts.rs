//! Simulated text-to-speech.
//!
//! Produces a fake audio reference and an estimated duration of half a
//! second per word.

use async_trait::async_trait;
use uuid::Uuid;

use crate::ports::{SpeechError, SynthesizedSpeech, TextToSpeech};

const SECONDS_PER_WORD: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct SimulatedTextToSpeech {
    default_voice_id: String,
}

impl SimulatedTextToSpeech {
    pub fn new(default_voice_id: impl Into<String>) -> Self {
        Self {
            default_voice_id: default_voice_id.into(),
        }
    }

    pub fn default_voice_id(&self) -> &str {
        &self.default_voice_id
    }
}

impl Default for SimulatedTextToSpeech {
    fn default() -> Self {
        Self::new("Joanna")
    }
}

#[async_trait]
impl TextToSpeech for SimulatedTextToSpeech {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<SynthesizedSpeech, SpeechError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SpeechError::EmptyText);
        }

        let voice_id = if voice_id.trim().is_empty() {
            self.default_voice_id.clone()
        } else {
            voice_id.to_string()
        };
        let words = text.split_whitespace().count();

        Ok(SynthesizedSpeech {
            audio_url: format!("/audio/generated_{}.mp3", Uuid::new_v4()),
            duration_secs: words as f32 * SECONDS_PER_WORD,
            voice_id,
            text_length: text.chars().count(),
        })
    }
}
