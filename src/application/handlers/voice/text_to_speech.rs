//! TextToSpeechHandler - synthesize arbitrary text.

use std::sync::Arc;
use std::time::Duration;

use crate::application::retry::RetryPolicy;
use crate::domain::call::CallError;
use crate::domain::foundation::ValidationError;
use crate::ports::{SynthesizedSpeech, TextToSpeech};

#[derive(Debug, Clone)]
pub struct TextToSpeechCommand {
    pub text: String,
    pub voice_id: Option<String>,
}

pub struct TextToSpeechHandler {
    tts: Arc<dyn TextToSpeech>,
    default_voice_id: String,
    timeout: Duration,
}

impl TextToSpeechHandler {
    pub fn new(tts: Arc<dyn TextToSpeech>, default_voice_id: impl Into<String>, timeout: Duration) -> Self {
        Self {
            tts,
            default_voice_id: default_voice_id.into(),
            timeout,
        }
    }

    pub async fn handle(&self, cmd: TextToSpeechCommand) -> Result<SynthesizedSpeech, CallError> {
        if cmd.text.trim().is_empty() {
            return Err(ValidationError::empty_field("text").into());
        }
        let voice_id = cmd.voice_id.unwrap_or_else(|| self.default_voice_id.clone());

        let speech = RetryPolicy::no_retry(self.timeout)
            .run("synthesis", |_| self.tts.synthesize(&cmd.text, &voice_id))
            .await?;
        Ok(speech)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::speech::SimulatedTextToSpeech;

    fn handler() -> TextToSpeechHandler {
        TextToSpeechHandler::new(Arc::new(SimulatedTextToSpeech::default()), "Joanna", Duration::from_secs(1))
    }

    #[tokio::test]
    async fn uses_default_voice() {
        let speech = handler()
            .handle(TextToSpeechCommand { text: "Thank you for calling".into(), voice_id: None })
            .await
            .unwrap();
        assert_eq!(speech.voice_id, "Joanna");
        assert!((speech.duration_secs - 2.0).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn blank_text_is_a_validation_error() {
        let err = handler()
            .handle(TextToSpeechCommand { text: " ".into(), voice_id: None })
            .await
            .unwrap_err();
        assert!(matches!(err, CallError::Validation(_)));
    }
}
