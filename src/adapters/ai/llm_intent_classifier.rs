//! Language-model intent classifier.
//!
//! Asks the AI provider for a JSON verdict over the recent conversation.
//! Any failure (provider error, timeout, unparseable output) degrades to
//! `unknown` with confidence 0.0 and is logged as `ClassificationDegraded`.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::call::{
    ClassificationDegraded, Intent, IntentClassification, IntentClassifier, Speaker, Utterance,
};
use crate::domain::foundation::CallId;
use crate::ports::{AIProvider, CompletionRequest, MessageRole, RequestMetadata};

/// Turns of context sent with each classification request.
const CONTEXT_TURNS: usize = 6;

const CLASSIFIER_PROMPT: &str = "You classify the caller's latest message on a healthcare billing call. \
Respond with JSON only, in the form {\"intent\": \"<intent>\", \"confidence\": <0..1>}. \
Valid intents: billing_question, payment_arrangement, insurance_question, appointment_request, \
complaint, escalate, end_call, unknown.";

#[derive(Debug, Deserialize)]
struct Verdict {
    intent: String,
    confidence: f32,
}

/// Intent classifier backed by an [`AIProvider`].
pub struct LlmIntentClassifier {
    provider: Arc<dyn AIProvider>,
    timeout: Duration,
}

impl LlmIntentClassifier {
    pub fn new(provider: Arc<dyn AIProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    fn build_request(call_id: &CallId, turn_history: &[Utterance]) -> CompletionRequest {
        let start = turn_history.len().saturating_sub(CONTEXT_TURNS);
        turn_history[start..].iter().fold(
            CompletionRequest::new(RequestMetadata::classification(call_id.clone()))
                .with_system_prompt(CLASSIFIER_PROMPT)
                .with_max_tokens(50)
                .with_temperature(0.0),
            |request, utterance| {
                let role = match utterance.speaker {
                    Speaker::Caller => MessageRole::User,
                    Speaker::System => MessageRole::Assistant,
                };
                request.with_message(role, utterance.text.clone())
            },
        )
    }

    async fn try_classify(
        &self,
        call_id: &CallId,
        turn_history: &[Utterance],
    ) -> Result<IntentClassification, ClassificationDegraded> {
        let request = Self::build_request(call_id, turn_history);
        let response = tokio::time::timeout(self.timeout, self.provider.complete(request))
            .await
            .map_err(|_| ClassificationDegraded::new(format!("timed out after {:?}", self.timeout)))?
            .map_err(|e| ClassificationDegraded::new(e.to_string()))?;

        parse_verdict(&response.content)
    }
}

/// Parse the model's verdict, tolerating prose around the JSON object.
fn parse_verdict(content: &str) -> Result<IntentClassification, ClassificationDegraded> {
    let start = content.find('{');
    let end = content.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => return Err(ClassificationDegraded::new("no JSON object in model output")),
    };

    let verdict: Verdict = serde_json::from_str(json)
        .map_err(|e| ClassificationDegraded::new(format!("malformed verdict: {}", e)))?;
    let intent: Intent = verdict
        .intent
        .parse()
        .map_err(|e| ClassificationDegraded::new(format!("{}", e)))?;

    Ok(IntentClassification::new(intent, verdict.confidence))
}

#[async_trait]
impl IntentClassifier for LlmIntentClassifier {
    async fn classify(&self, call_id: &CallId, turn_history: &[Utterance]) -> IntentClassification {
        if !turn_history.iter().any(Utterance::is_caller) {
            return IntentClassification::unknown();
        }

        match self.try_classify(call_id, turn_history).await {
            Ok(classification) => classification,
            Err(degraded) => {
                tracing::warn!(call_id = %call_id, error = %degraded, "ClassificationDegraded");
                IntentClassification::unknown()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::ports::RequestPurpose;

    fn call_id() -> CallId {
        CallId::new("CA-llm").unwrap()
    }

    fn history() -> Vec<Utterance> {
        vec![Utterance::caller("Can I pay this off over a few months?", Some(0.9))]
    }

    fn classifier(provider: &MockAIProvider) -> LlmIntentClassifier {
        LlmIntentClassifier::new(Arc::new(provider.clone()), Duration::from_millis(200))
    }

    #[tokio::test]
    async fn parses_json_verdict() {
        let provider = MockAIProvider::new()
            .with_response(r#"{"intent": "payment_arrangement", "confidence": 0.82}"#);
        let result = classifier(&provider).classify(&call_id(), &history()).await;

        assert_eq!(result.intent, Intent::PaymentArrangement);
        assert!((result.confidence - 0.82).abs() < 1e-6);
        assert_eq!(provider.get_calls()[0].metadata.purpose, RequestPurpose::Classification);
        assert_eq!(provider.generation_call_count(), 0);
    }

    #[tokio::test]
    async fn tolerates_prose_around_json() {
        let provider = MockAIProvider::new()
            .with_response("Sure! {\"intent\": \"escalate\", \"confidence\": 1.4} Hope that helps.");
        let result = classifier(&provider).classify(&call_id(), &history()).await;

        assert_eq!(result.intent, Intent::Escalate);
        assert_eq!(result.confidence, 1.0);
    }

    #[tokio::test]
    async fn provider_error_degrades_to_unknown() {
        let provider = MockAIProvider::new().with_error(MockError::Unavailable {
            message: "down".to_string(),
        });
        let result = classifier(&provider).classify(&call_id(), &history()).await;
        assert_eq!(result, IntentClassification::unknown());
    }

    #[tokio::test]
    async fn unparseable_output_degrades_to_unknown() {
        let provider = MockAIProvider::new().with_response("billing, probably");
        let result = classifier(&provider).classify(&call_id(), &history()).await;
        assert_eq!(result, IntentClassification::unknown());

        let provider = MockAIProvider::new()
            .with_response(r#"{"intent": "refund_request", "confidence": 0.9}"#);
        let result = classifier(&provider).classify(&call_id(), &history()).await;
        assert_eq!(result, IntentClassification::unknown());
    }

    #[tokio::test]
    async fn timeout_degrades_to_unknown() {
        let provider = MockAIProvider::new()
            .with_response(r#"{"intent": "billing_question", "confidence": 0.9}"#)
            .with_delay(Duration::from_secs(5));
        let classifier = LlmIntentClassifier::new(Arc::new(provider), Duration::from_millis(20));

        let result = classifier.classify(&call_id(), &history()).await;
        assert_eq!(result, IntentClassification::unknown());
    }

    #[tokio::test]
    async fn no_caller_turn_skips_provider() {
        let provider = MockAIProvider::new();
        let result = classifier(&provider).classify(&call_id(), &[]).await;

        assert_eq!(result, IntentClassification::unknown());
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn request_includes_recent_context_only() {
        let turns: Vec<Utterance> = (0..10)
            .map(|i| {
                if i % 2 == 0 {
                    Utterance::caller(format!("caller {}", i), None)
                } else {
                    Utterance::system(format!("agent {}", i))
                }
            })
            .collect();
        let request = LlmIntentClassifier::build_request(&call_id(), &turns);

        assert_eq!(request.messages.len(), CONTEXT_TURNS);
        assert_eq!(request.messages[0].content, "caller 4");
        assert_eq!(request.messages[0].role, MessageRole::User);
        assert_eq!(request.temperature, Some(0.0));
    }
}
