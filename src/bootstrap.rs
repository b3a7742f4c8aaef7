//! Composition root - builds the application from configuration.

use std::path::Path;
use std::sync::Arc;

use secrecy::{ExposeSecret, Secret};

use crate::adapters::ai::{LlmIntentClassifier, MockAIProvider, OpenAIConfig, OpenAIProvider};
use crate::adapters::handoff::InMemoryHandoffQueue;
use crate::adapters::http::AppState;
use crate::adapters::registry::InMemoryCallRegistry;
use crate::adapters::speech::{SimulatedSpeechToText, SimulatedTextToSpeech};
use crate::adapters::telephony::SimulatedTelephonyGateway;
use crate::application::handlers::{
    CallAnalyticsHandler, ConversationAnalyticsHandler, EndCallHandler, EscalateCallHandler,
    GetCallHandler, ListActiveCallsHandler, PerformanceMetricsHandler, ProcessAudioHandler, SimulateConversationHandler, StartCallHandler,
    TextToSpeechHandler, VoicePipeline,
};
use crate::application::{OrchestratorSettings, RetryPolicy, TurnOrchestrator};
use crate::config::{AiConfig, AiProviderKind, AppConfig, ClassifierKind, ConversationConfig};
use crate::domain::call::{
    EscalationPolicy, IntentClassifier, KeywordIntentClassifier, PromptStoreError,
    PromptTemplateStore,
};
use crate::ports::{
    AIError, AIProvider, CallRegistry, HumanHandoff, SpeechToText, TelephonyGateway, TextToSpeech,
};

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Failed to read prompt templates from {path}: {source}")]
    TemplateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid prompt templates: {0}")]
    Templates(#[from] PromptStoreError),

    #[error("AI provider setup failed: {0}")]
    Provider(#[from] AIError),

    #[error("OPENAI_API_KEY is required for the openai provider")]
    MissingApiKey,
}

/// Every port implementation the application runs against.
#[derive(Clone)]
pub struct Collaborators {
    pub registry: Arc<dyn CallRegistry>,
    pub ai_provider: Arc<dyn AIProvider>,
    pub classifier: Arc<dyn IntentClassifier>,
    pub handoff: Arc<dyn HumanHandoff>,
    pub telephony: Arc<dyn TelephonyGateway>,
    pub stt: Arc<dyn SpeechToText>,
    pub tts: Arc<dyn TextToSpeech>,
    pub templates: Arc<PromptTemplateStore>,
}

impl Collaborators {
    /// Collaborators described by `config`. Everything except the AI
    /// provider is simulated in-process.
    pub fn from_config(config: &AppConfig) -> Result<Self, BootstrapError> {
        let ai_provider = build_ai_provider(&config.ai)?;
        let classifier = build_classifier(&config.conversation, ai_provider.clone());

        Ok(Self {
            registry: Arc::new(InMemoryCallRegistry::new()),
            classifier,
            ai_provider,
            handoff: Arc::new(InMemoryHandoffQueue::new(config.voice.handoff_queue.clone())),
            telephony: Arc::new(SimulatedTelephonyGateway::new()),
            stt: Arc::new(SimulatedSpeechToText::new(config.voice.language.clone())),
            tts: Arc::new(SimulatedTextToSpeech::new(config.voice.default_voice_id.clone())),
            templates: Arc::new(load_templates(&config.conversation)?),
        })
    }
}

pub fn build_ai_provider(config: &AiConfig) -> Result<Arc<dyn AIProvider>, BootstrapError> {
    match config.provider {
        AiProviderKind::Mock => Ok(Arc::new(MockAIProvider::new())),
        AiProviderKind::OpenAI => {
            let api_key = config
                .openai_api_key
                .as_ref()
                .ok_or(BootstrapError::MissingApiKey)?;
            let mut openai = OpenAIConfig::new(Secret::new(api_key.expose_secret().clone()))
                .with_model(config.model.clone())
                .with_timeout(config.timeout());
            if let Some(base_url) = &config.base_url {
                openai = openai.with_base_url(base_url.clone());
            }
            Ok(Arc::new(OpenAIProvider::new(openai)?))
        }
    }
}

pub fn build_classifier(
    config: &ConversationConfig,
    ai_provider: Arc<dyn AIProvider>,
) -> Arc<dyn IntentClassifier> {
    match config.classifier {
        ClassifierKind::Keyword => Arc::new(KeywordIntentClassifier::new()),
        ClassifierKind::Llm => Arc::new(LlmIntentClassifier::new(
            ai_provider,
            config.collaborator_timeout(),
        )),
    }
}

/// Built-in templates, overridden by the configured YAML file if any.
pub fn load_templates(config: &ConversationConfig) -> Result<PromptTemplateStore, BootstrapError> {
    match &config.prompt_templates_path {
        None => Ok(PromptTemplateStore::built_in()),
        Some(path) => load_template_file(path),
    }
}

fn load_template_file(path: &Path) -> Result<PromptTemplateStore, BootstrapError> {
    let yaml = std::fs::read_to_string(path).map_err(|source| BootstrapError::TemplateFile {
        path: path.display().to_string(),
        source,
    })?;
    let overrides = PromptTemplateStore::parse_yaml(&yaml)?;
    tracing::info!(path = %path.display(), overrides = overrides.len(), "prompt templates loaded");
    Ok(PromptTemplateStore::built_in_with_overrides(overrides)?)
}

pub fn orchestrator_settings(config: &AppConfig) -> OrchestratorSettings {
    let conversation = &config.conversation;
    OrchestratorSettings {
        policy: EscalationPolicy::new(
            conversation.max_consecutive_unknown,
            conversation.max_history_len,
            conversation.end_call_threshold,
        ),
        retry: RetryPolicy::new(
            conversation.generation_max_attempts,
            conversation.retry_initial_backoff(),
            conversation.collaborator_timeout(),
        ),
        classification_timeout: conversation.collaborator_timeout(),
        handoff_timeout: conversation.collaborator_timeout(),
        max_tokens: Some(config.ai.max_tokens),
        temperature: Some(config.ai.temperature),
    }
}

/// Wire handlers over `collaborators` into the HTTP state.
pub fn build_state(config: &AppConfig, collaborators: Collaborators) -> AppState {
    let timeout = config.conversation.collaborator_timeout();
    let orchestrator = Arc::new(
        TurnOrchestrator::new(
            collaborators.registry.clone(),
            collaborators.classifier.clone(),
            collaborators.ai_provider.clone(),
            collaborators.handoff.clone(),
            collaborators.templates.clone(),
        )
        .with_settings(orchestrator_settings(config)),
    );

    let pipeline = VoicePipeline {
        stt: collaborators.stt.clone(),
        tts: collaborators.tts.clone(),
        telephony: collaborators.telephony.clone(),
        default_voice_id: config.voice.default_voice_id.clone(),
        handoff_queue: config.voice.handoff_queue.clone(),
        collaborator_timeout: timeout,
    };

    AppState {
        start_call: Arc::new(StartCallHandler::new(
            collaborators.registry.clone(),
            collaborators.templates.clone(),
        )),
        get_call: Arc::new(GetCallHandler::new(collaborators.registry.clone())),
        escalate_call: Arc::new(EscalateCallHandler::new(
            collaborators.registry.clone(),
            collaborators.handoff.clone(),
            collaborators.telephony.clone(),
            config.voice.handoff_queue.clone(),
            timeout,
        )),
        end_call: Arc::new(EndCallHandler::new(
            collaborators.registry.clone(),
            collaborators.telephony.clone(),
            timeout,
        )),
        list_active_calls: Arc::new(ListActiveCallsHandler::new(
            collaborators.registry.clone(),
            config.conversation.max_call_duration(),
        )),
        simulate_conversation: Arc::new(SimulateConversationHandler::new(orchestrator.clone())),
        process_audio: Arc::new(ProcessAudioHandler::new(orchestrator.clone(), pipeline)),
        text_to_speech: Arc::new(TextToSpeechHandler::new(
            collaborators.tts.clone(),
            config.voice.default_voice_id.clone(),
            timeout,
        )),
        performance_metrics: Arc::new(PerformanceMetricsHandler::new(collaborators.registry.clone())),
        call_analytics: Arc::new(CallAnalyticsHandler::new(collaborators.registry.clone())),
        conversation_analytics: Arc::new(ConversationAnalyticsHandler::new(
            collaborators.registry.clone(),
        )),
        templates: collaborators.templates,
        orchestrator,
    }
}
