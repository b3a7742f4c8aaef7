//! Speech and handoff collaborator settings

use serde::Deserialize;

/// Voice collaborator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceConfig {
    /// Voice used when a synthesis request names none
    #[serde(default = "default_voice_id")]
    pub default_voice_id: String,

    #[serde(default = "default_language")]
    pub language: String,

    /// Queue escalated calls are routed to
    #[serde(default = "default_handoff_queue")]
    pub handoff_queue: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            default_voice_id: default_voice_id(),
            language: default_language(),
            handoff_queue: default_handoff_queue(),
        }
    }
}

fn default_voice_id() -> String {
    "Joanna".to_string()
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_handoff_queue() -> String {
    "healthcare_support".to_string()
}
