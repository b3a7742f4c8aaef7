//! Request and response bodies for voice endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::call::{ExampleTurn, PromptTemplate, Scenario};

#[derive(Debug, Clone, Deserialize)]
pub struct SimulateConversationRequest {
    pub scenario: String,
    pub utterances: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextToSpeechRequest {
    pub text: String,
    #[serde(default)]
    pub voice_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessAudioParams {
    #[serde(default)]
    pub voice_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptTemplateView {
    pub scenario: Scenario,
    pub name: &'static str,
    /// Instructions as sent to the model, privacy preamble included.
    pub system_prompt: String,
    pub example_turns: Vec<ExampleTurn>,
}

impl From<&PromptTemplate> for PromptTemplateView {
    fn from(template: &PromptTemplate) -> Self {
        Self {
            scenario: template.scenario,
            name: template.scenario.display_name(),
            system_prompt: template.system_prompt(),
            example_turns: template.example_turns.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptTemplatesResponse {
    pub templates: Vec<PromptTemplateView>,
    pub total: usize,
}
