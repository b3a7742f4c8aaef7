//! Simulated speech-to-text.
//!
//! Treats the audio payload as UTF-8 text, which lets the demo and tests
//! drive the audio path without real speech processing.

use async_trait::async_trait;

use crate::ports::{SpeechError, SpeechToText, Transcription};

const SIMULATED_CONFIDENCE: f32 = 0.95;

#[derive(Debug, Clone)]
pub struct SimulatedSpeechToText {
    language: String,
}

impl SimulatedSpeechToText {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }
}

impl Default for SimulatedSpeechToText {
    fn default() -> Self {
        Self::new("en-US")
    }
}

#[async_trait]
impl SpeechToText for SimulatedSpeechToText {
    async fn transcribe(&self, audio: &[u8]) -> Result<Transcription, SpeechError> {
        let text = std::str::from_utf8(audio)
            .map_err(|e| SpeechError::UnsupportedAudio(format!("payload is not UTF-8: {}", e)))?
            .trim();

        if text.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }

        Ok(Transcription {
            text: text.to_string(),
            confidence: SIMULATED_CONFIDENCE,
            language: self.language.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn decodes_utf8_payload() {
        let stt = SimulatedSpeechToText::default();
        let t = stt.transcribe(b"  I have a question about my bill \n").await.unwrap();

        assert_eq!(t.text, "I have a question about my bill");
        assert!((t.confidence - 0.95).abs() < f32::EPSILON);
        assert_eq!(t.language, "en-US");
    }

    #[tokio::test]
    async fn rejects_empty_and_binary_payloads() {
        let stt = SimulatedSpeechToText::default();
        assert_eq!(stt.transcribe(b"").await.unwrap_err(), SpeechError::EmptyAudio);
        assert_eq!(stt.transcribe(b"   ").await.unwrap_err(), SpeechError::EmptyAudio);
        assert!(matches!(
            stt.transcribe(&[0xff, 0xfe, 0x00]).await.unwrap_err(),
            SpeechError::UnsupportedAudio(_)
        ));
    }
}
