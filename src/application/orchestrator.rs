//! Turn orchestrator - drives one caller turn end to end.
//!
//! A turn runs under the call's turn lock:
//!
//! 1. load the state and append the caller utterance (persisted at once)
//! 2. classify the updated history
//! 3. run the escalation policy
//! 4. generate a reply (continue) or use the fixed reply (escalate/end)
//! 5. write the outcome back with a single registry update
//!
//! If generation is still failing after retries, nothing past step 1 is
//! written: the stored state keeps the caller utterance and nothing else.
//!
//! Cancellation is only observed before step 5. Once the update is
//! accepted the turn runs to completion, and the handoff notification for
//! a newly escalated call runs on its own task so it survives the caller
//! dropping the turn.

use futures::future::{self, Future};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::application::retry::RetryPolicy;
use crate::audit;
use crate::domain::call::{
    slots::extract_slots, CallError, ClassificationDegraded, ConversationState, EscalationDecision,
    EscalationPolicy, EscalationReason, ExampleRole, HandoffSummary, IntentClassification,
    IntentClassifier, PromptTemplateStore, Speaker, Utterance,
};
use crate::domain::foundation::{CallId, ValidationError};
use crate::ports::{
    AIError, AIProvider, CallRegistry, CompletionRequest, HandoffRequest, HumanHandoff,
    MessageRole, RequestMetadata, RoutingAck, TurnGuard,
};

/// Tunables for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub policy: EscalationPolicy,
    /// Applied to each generation request.
    pub retry: RetryPolicy,
    pub classification_timeout: Duration,
    pub handoff_timeout: Duration,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            policy: EscalationPolicy::default(),
            retry: RetryPolicy::default(),
            classification_timeout: Duration::from_secs(10),
            handoff_timeout: Duration::from_secs(10),
            max_tokens: Some(1000),
            temperature: Some(0.7),
        }
    }
}

/// What a turn produced.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    /// Text to speak back to the caller.
    pub reply: String,
    pub decision: EscalationDecision,
    pub classification: IntentClassification,
    /// State after the turn was written back.
    pub state: ConversationState,
    /// This turn moved the call from bot-handled to escalated.
    pub newly_escalated: bool,
    /// Present when this turn handed the call to a human.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handoff: Option<RoutingAck>,
}

/// Everything a turn writes after the caller utterance.
#[derive(Debug, Clone)]
struct TurnDelta {
    classification: IntentClassification,
    slots: Vec<(&'static str, String)>,
    system_reply: Option<String>,
    escalation: Option<EscalationReason>,
    end: bool,
}

impl TurnDelta {
    fn apply(self, state: &mut ConversationState) {
        state.record_classification(&self.classification);
        for (key, value) in self.slots {
            state.set_slot(key, value);
        }
        if let Some(reply) = self.system_reply {
            state.turn_history.push(Utterance::system(reply));
        }
        if let Some(reason) = self.escalation {
            state.mark_escalated(reason);
        }
        if self.end {
            state.mark_ended();
        }
    }
}

/// A decided turn waiting to be written back.
struct PreparedTurn {
    _turn: TurnGuard,
    state: ConversationState,
    classification: IntentClassification,
    decision: EscalationDecision,
    reason: Option<EscalationReason>,
    reply: String,
}

/// Drives conversation turns for every call.
///
/// Cheap to share: all collaborators sit behind `Arc`s.
pub struct TurnOrchestrator {
    registry: Arc<dyn CallRegistry>,
    classifier: Arc<dyn IntentClassifier>,
    ai_provider: Arc<dyn AIProvider>,
    handoff: Arc<dyn HumanHandoff>,
    templates: Arc<PromptTemplateStore>,
    settings: OrchestratorSettings,
}

impl TurnOrchestrator {
    pub fn new(
        registry: Arc<dyn CallRegistry>,
        classifier: Arc<dyn IntentClassifier>,
        ai_provider: Arc<dyn AIProvider>,
        handoff: Arc<dyn HumanHandoff>,
        templates: Arc<PromptTemplateStore>,
    ) -> Self {
        Self {
            registry,
            classifier,
            ai_provider,
            handoff,
            templates,
            settings: OrchestratorSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: OrchestratorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn registry(&self) -> &Arc<dyn CallRegistry> {
        &self.registry
    }

    pub fn templates(&self) -> &Arc<PromptTemplateStore> {
        &self.templates
    }

    /// Handle one caller utterance.
    ///
    /// Dropping the returned future abandons the turn; the stored state is
    /// then whatever the registry last accepted.
    pub async fn handle_turn(
        &self,
        call_id: &CallId,
        text: &str,
        confidence: Option<f32>,
    ) -> Result<TurnOutcome, CallError> {
        self.handle_turn_cancellable(call_id, text, confidence, future::pending::<()>())
            .await
    }

    /// Like [`handle_turn`](Self::handle_turn), abandoned with
    /// `CallError::Cancelled` if `cancel` completes before the turn's
    /// outcome is written back. After that point `cancel` is ignored.
    pub async fn handle_turn_cancellable<C>(
        &self,
        call_id: &CallId,
        text: &str,
        confidence: Option<f32>,
        cancel: C,
    ) -> Result<TurnOutcome, CallError>
    where
        C: Future<Output = ()> + Send,
    {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::empty_field("text").into());
        }

        let prepared = tokio::select! {
            biased;
            _ = cancel => {
                tracing::info!(call_id = %call_id, "turn cancelled");
                return Err(CallError::Cancelled(call_id.clone()));
            }
            prepared = self.prepare_turn(call_id, text, confidence) => prepared?,
        };

        self.commit_turn(call_id, text, prepared).await
    }

    /// Lock, append the caller utterance, classify, decide and produce the
    /// reply. Nothing beyond the caller utterance is written here.
    async fn prepare_turn(
        &self,
        call_id: &CallId,
        text: &str,
        confidence: Option<f32>,
    ) -> Result<PreparedTurn, CallError> {
        let turn = self.registry.lock(call_id).await?;
        let current = self.registry.get(call_id).await?;
        if current.ended {
            return Err(CallError::CallEnded(call_id.clone()));
        }

        let state = self
            .registry
            .append_turn(call_id, Utterance::caller(text, confidence))
            .await?;

        let classification = self.classify(&state).await;
        let (decision, reason) = self.settings.policy.decide_with_reason(
            &state,
            classification.intent,
            classification.confidence,
        );
        tracing::debug!(
            call_id = %call_id,
            intent = %classification.intent,
            confidence = classification.confidence,
            decision = %decision,
            "turn decided"
        );

        let reply = match decision.fixed_reply() {
            Some(fixed) => fixed.to_string(),
            None => self.generate_reply(&state).await?,
        };

        Ok(PreparedTurn {
            _turn: turn,
            state,
            classification,
            decision,
            reason,
            reply,
        })
    }

    /// Write the prepared turn back with one update, then audit and notify.
    async fn commit_turn(
        &self,
        call_id: &CallId,
        text: &str,
        prepared: PreparedTurn,
    ) -> Result<TurnOutcome, CallError> {
        let PreparedTurn {
            _turn,
            state,
            classification,
            decision,
            reason,
            reply,
        } = prepared;

        let newly_escalated = decision == EscalationDecision::EscalateToHuman && !state.escalated;
        let slots = extract_slots(text);
        let delta = TurnDelta {
            classification,
            slots: slots.clone(),
            system_reply: (decision == EscalationDecision::Continue).then(|| reply.clone()),
            escalation: if newly_escalated { reason } else { None },
            end: decision == EscalationDecision::EndCall,
        };

        let updated = self
            .registry
            .update(call_id, Box::new(move |s| delta.apply(s)))
            .await?;

        for (key, value) in &slots {
            audit::slot_captured(call_id, key, value);
        }
        audit::turn_handled(call_id, text.chars().count(), &classification, decision, updated.status());

        let handoff = if newly_escalated {
            if let Some(reason) = &updated.escalation_reason {
                audit::escalated(call_id, reason);
            }
            self.notify_handoff(updated.clone()).await
        } else {
            None
        };
        if decision == EscalationDecision::EndCall {
            audit::ended(call_id);
        }

        Ok(TurnOutcome {
            reply,
            decision,
            classification,
            state: updated,
            newly_escalated,
            handoff,
        })
    }

    async fn classify(&self, state: &ConversationState) -> IntentClassification {
        let timeout = self.settings.classification_timeout;
        match tokio::time::timeout(timeout, self.classifier.classify(&state.call_id, &state.turn_history)).await {
            Ok(classification) => classification,
            Err(_) => {
                let degraded = ClassificationDegraded::new(format!("timed out after {}ms", timeout.as_millis()));
                tracing::warn!(call_id = %state.call_id, error = %degraded, "ClassificationDegraded");
                IntentClassification::unknown()
            }
        }
    }

    fn build_generation_request(&self, state: &ConversationState) -> Result<CompletionRequest, CallError> {
        let template = self.templates.get(state.scenario)?;

        let mut request = CompletionRequest::new(RequestMetadata::generation(state.call_id.clone()))
            .with_system_prompt(template.system_prompt());
        if let Some(max_tokens) = self.settings.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = self.settings.temperature {
            request = request.with_temperature(temperature);
        }

        for example in &template.example_turns {
            let role = match example.role {
                ExampleRole::Caller => MessageRole::User,
                ExampleRole::Agent => MessageRole::Assistant,
            };
            request = request.with_message(role, example.text.clone());
        }
        let skipped = state.turn_history.len() - self.history_that_fits(&request, &state.turn_history);
        if skipped > 0 {
            tracing::debug!(call_id = %state.call_id, skipped, "history trimmed to the context window");
        }
        for utterance in &state.turn_history[skipped..] {
            let role = match utterance.speaker {
                Speaker::Caller => MessageRole::User,
                Speaker::System => MessageRole::Assistant,
            };
            request = request.with_message(role, utterance.text.clone());
        }

        Ok(request)
    }

    /// How many of the newest history utterances fit in the provider's
    /// context window next to `request` and the reply budget. The latest
    /// utterance is always kept.
    fn history_that_fits(&self, request: &CompletionRequest, history: &[Utterance]) -> usize {
        let provider = &self.ai_provider;
        let prompt_tokens: u32 = request
            .system_prompt
            .iter()
            .map(|prompt| provider.estimate_tokens(prompt))
            .chain(request.messages.iter().map(|m| provider.estimate_tokens(&m.content)))
            .sum();
        let mut budget = provider
            .provider_info()
            .max_context_tokens
            .saturating_sub(self.settings.max_tokens.unwrap_or(0))
            .saturating_sub(prompt_tokens);

        let mut kept = 0;
        for utterance in history.iter().rev() {
            let cost = provider.estimate_tokens(&utterance.text);
            if kept > 0 && cost > budget {
                break;
            }
            budget = budget.saturating_sub(cost);
            kept += 1;
        }
        kept
    }

    async fn generate_reply(&self, state: &ConversationState) -> Result<String, CallError> {
        let request = self.build_generation_request(state)?;
        let provider = &self.ai_provider;

        let response = self
            .settings
            .retry
            .run("generation", |attempt| {
                let request = request.clone();
                async move {
                    tracing::debug!(call_id = %request.metadata.call_id, attempt, "generating reply");
                    let response = provider.complete(request).await?;
                    if response.content.trim().is_empty() {
                        return Err(AIError::unavailable("empty completion"));
                    }
                    Ok(response)
                }
            })
            .await
            .map_err(|err| CallError::GenerationUnavailable {
                call_id: state.call_id.clone(),
                reason: err.to_string(),
            })?;

        Ok(response.content.trim().to_string())
    }

    /// Tell the handoff collaborator about a newly escalated call. Failure
    /// leaves the call escalated and is only logged.
    ///
    /// The notification runs on a spawned task: the escalation is already
    /// stored, so dropping the turn must not drop the notification.
    async fn notify_handoff(&self, state: ConversationState) -> Option<RoutingAck> {
        let handoff = self.handoff.clone();
        let timeout = self.settings.handoff_timeout;
        let call_id = state.call_id.clone();
        let task = tokio::spawn(async move { notify_handoff(handoff.as_ref(), timeout, &state).await });

        match task.await {
            Ok(ack) => ack,
            Err(err) => {
                tracing::error!(call_id = %call_id, error = %err, "handoff task failed");
                None
            }
        }
    }
}

/// Send `state` to the handoff collaborator under `timeout`.
pub(crate) async fn notify_handoff(
    handoff: &dyn HumanHandoff,
    timeout: Duration,
    state: &ConversationState,
) -> Option<RoutingAck> {
    let request = HandoffRequest {
        call_id: state.call_id.clone(),
        scenario: state.scenario,
        reason: state.escalation_reason.clone(),
        turn_history: state.turn_history.clone(),
        summary: HandoffSummary::from_state(state),
    };

    let result = RetryPolicy::no_retry(timeout)
        .run("handoff", |_| handoff.request_handoff(request.clone()))
        .await;

    match result {
        Ok(ack) => {
            tracing::info!(
                call_id = %state.call_id,
                queue = %ack.agent_queue,
                position = ack.position,
                "call handed off"
            );
            Some(ack)
        }
        Err(err) => {
            tracing::warn!(call_id = %state.call_id, error = %err, "handoff notification failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::adapters::handoff::InMemoryHandoffQueue;
    use crate::adapters::registry::InMemoryCallRegistry;
    use crate::domain::call::{CallStatus, Intent, KeywordIntentClassifier, Scenario, HANDOFF_UTTERANCE};
    use crate::ports::{HandoffError, RequestPurpose};
    use async_trait::async_trait;

    struct Fixture {
        registry: Arc<InMemoryCallRegistry>,
        provider: MockAIProvider,
        handoff: InMemoryHandoffQueue,
        orchestrator: TurnOrchestrator,
    }

    fn fast_settings() -> OrchestratorSettings {
        OrchestratorSettings {
            retry: RetryPolicy::new(2, Duration::from_millis(1), Duration::from_millis(200)),
            classification_timeout: Duration::from_millis(200),
            handoff_timeout: Duration::from_millis(200),
            ..OrchestratorSettings::default()
        }
    }

    fn fixture(provider: MockAIProvider) -> Fixture {
        let registry = Arc::new(InMemoryCallRegistry::new());
        let handoff = InMemoryHandoffQueue::default();
        let orchestrator = TurnOrchestrator::new(
            registry.clone(),
            Arc::new(KeywordIntentClassifier),
            Arc::new(provider.clone()),
            Arc::new(handoff.clone()),
            Arc::new(PromptTemplateStore::built_in()),
        )
        .with_settings(fast_settings());
        Fixture {
            registry,
            provider,
            handoff,
            orchestrator,
        }
    }

    async fn start(f: &Fixture, id: &str) -> CallId {
        let call_id = CallId::new(id).unwrap();
        f.registry.create(call_id.clone(), Scenario::BillingInquiry).await.unwrap();
        call_id
    }

    #[tokio::test]
    async fn continue_turn_appends_caller_and_reply() {
        let f = fixture(MockAIProvider::new().with_response("Let me look at that bill."));
        let id = start(&f, "CA1").await;

        let outcome = f.orchestrator.handle_turn(&id, "I have a question about my bill", None).await.unwrap();

        assert_eq!(outcome.decision, EscalationDecision::Continue);
        assert_eq!(outcome.reply, "Let me look at that bill.");
        assert_eq!(outcome.classification.intent, Intent::BillingQuestion);
        assert_eq!(outcome.state.turn_history.len(), 2);
        assert_eq!(outcome.state.turn_history[1].speaker, Speaker::System);
        assert_eq!(outcome.state.intent_trail, vec![Intent::BillingQuestion]);
        assert_eq!(f.registry.get(&id).await.unwrap(), outcome.state);
    }

    #[tokio::test]
    async fn generation_request_carries_template_and_history() {
        let f = fixture(MockAIProvider::new());
        let id = start(&f, "CA1").await;
        f.orchestrator.handle_turn(&id, "Why is my balance so high?", None).await.unwrap();

        let request = &f.provider.get_calls()[0];
        assert_eq!(request.metadata.purpose, RequestPurpose::Generation);
        assert!(request.system_prompt.as_deref().unwrap().starts_with("You are a HIPAA-compliant"));
        let last = request.messages.last().unwrap();
        assert_eq!(last.role, MessageRole::User);
        assert_eq!(last.content, "Why is my balance so high?");
    }

    #[tokio::test]
    async fn history_is_trimmed_to_the_context_window() {
        let f = fixture(MockAIProvider::new().with_context_window(1));
        let id = start(&f, "CA1").await;
        f.orchestrator.handle_turn(&id, "First question about my bill", None).await.unwrap();
        f.orchestrator.handle_turn(&id, "Second question about my bill", None).await.unwrap();

        let request = &f.provider.get_calls()[1];
        let contents: Vec<&str> = request.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents.last(), Some(&"Second question about my bill"));
        assert!(!contents.contains(&"First question about my bill"));
    }

    #[tokio::test]
    async fn escalation_skips_generation_and_notifies_handoff() {
        let f = fixture(MockAIProvider::new());
        let id = start(&f, "CA1").await;

        let outcome = f.orchestrator.handle_turn(&id, "I want to talk to a human", None).await.unwrap();

        assert_eq!(outcome.decision, EscalationDecision::EscalateToHuman);
        assert_eq!(outcome.reply, HANDOFF_UTTERANCE);
        assert!(outcome.state.escalated);
        assert!(outcome.newly_escalated);
        assert_eq!(outcome.state.escalation_reason, Some(EscalationReason::CallerRequested));
        assert_eq!(outcome.state.turn_history.len(), 1);
        assert_eq!(f.provider.generation_call_count(), 0);
        assert_eq!(outcome.handoff.unwrap().position, 1);
        assert_eq!(f.handoff.len().await, 1);
    }

    #[tokio::test]
    async fn escalated_call_is_not_renotified() {
        let f = fixture(MockAIProvider::new());
        let id = start(&f, "CA1").await;
        f.orchestrator.handle_turn(&id, "Get me a supervisor", None).await.unwrap();

        let outcome = f.orchestrator.handle_turn(&id, "Hello? Are you there?", None).await.unwrap();

        assert_eq!(outcome.decision, EscalationDecision::EscalateToHuman);
        assert!(!outcome.newly_escalated);
        assert!(outcome.handoff.is_none());
        assert_eq!(f.provider.generation_call_count(), 0);
    }

    #[tokio::test]
    async fn confident_end_call_ends_the_call() {
        let f = fixture(MockAIProvider::new());
        let id = start(&f, "CA1").await;

        let outcome = f.orchestrator.handle_turn(&id, "That's all, goodbye", None).await.unwrap();

        assert_eq!(outcome.decision, EscalationDecision::EndCall);
        assert_eq!(outcome.state.status(), CallStatus::Ended);
        let err = f.orchestrator.handle_turn(&id, "Wait, one more thing", None).await.unwrap_err();
        assert_eq!(err, CallError::CallEnded(id));
    }

    #[tokio::test]
    async fn failed_generation_rolls_back_to_caller_utterance() {
        let provider = MockAIProvider::new().with_errors(MockError::Unavailable { message: "down".into() }, 2);
        let f = fixture(provider);
        let id = start(&f, "CA1").await;

        let err = f.orchestrator.handle_turn(&id, "What is this charge?", None).await.unwrap_err();

        assert!(matches!(err, CallError::GenerationUnavailable { .. }));
        assert!(err.is_retryable());
        assert_eq!(f.provider.generation_call_count(), 2);
        let state = f.registry.get(&id).await.unwrap();
        assert_eq!(state.turn_history.len(), 1);
        assert!(state.turn_history[0].is_caller());
        assert!(state.intent_trail.is_empty());
        assert!(!state.escalated && !state.ended);
    }

    #[tokio::test]
    async fn transient_generation_failure_is_retried() {
        let provider = MockAIProvider::new()
            .with_error(MockError::Network { message: "reset".into() })
            .with_response("Here to help.");
        let f = fixture(provider);
        let id = start(&f, "CA1").await;

        let outcome = f.orchestrator.handle_turn(&id, "Question about my invoice", None).await.unwrap();
        assert_eq!(outcome.reply, "Here to help.");
        assert_eq!(f.provider.generation_call_count(), 2);
    }

    #[tokio::test]
    async fn slots_are_captured_from_caller_text() {
        let f = fixture(MockAIProvider::new());
        let id = start(&f, "CA1").await;

        let outcome = f
            .orchestrator
            .handle_turn(&id, "My account number is 4455667 and I owe $120.50", None)
            .await
            .unwrap();

        assert_eq!(outcome.state.slots.get("account_id").map(String::as_str), Some("4455667"));
        assert_eq!(outcome.state.slots.get("amount").map(String::as_str), Some("$120.50"));
    }

    #[tokio::test]
    async fn cancellation_leaves_rollback_state() {
        let f = fixture(MockAIProvider::new().with_delay(Duration::from_millis(150)));
        let id = start(&f, "CA1").await;

        let err = f
            .orchestrator
            .handle_turn_cancellable(&id, "About my bill", None, tokio::time::sleep(Duration::from_millis(20)))
            .await
            .unwrap_err();

        assert_eq!(err, CallError::Cancelled(id.clone()));
        let state = f.registry.get(&id).await.unwrap();
        assert_eq!(state.turn_history.len(), 1);
        assert!(state.intent_trail.is_empty());

        // the turn lock was released
        let outcome = f.orchestrator.handle_turn(&id, "About my bill", None).await.unwrap();
        assert_eq!(outcome.state.turn_history.len(), 3);
    }

    /// Handoff that takes a while to acknowledge and records what it got.
    #[derive(Clone, Default)]
    struct SlowHandoff {
        received: Arc<tokio::sync::Mutex<Vec<CallId>>>,
    }

    #[async_trait]
    impl HumanHandoff for SlowHandoff {
        async fn request_handoff(&self, request: HandoffRequest) -> Result<RoutingAck, HandoffError> {
            tokio::time::sleep(Duration::from_millis(100)).await;
            let mut received = self.received.lock().await;
            received.push(request.call_id.clone());
            Ok(RoutingAck {
                call_id: request.call_id,
                agent_queue: "healthcare_support".into(),
                position: received.len(),
                acknowledged_at: chrono::Utc::now(),
            })
        }
    }

    fn slow_handoff_orchestrator(registry: Arc<InMemoryCallRegistry>, handoff: SlowHandoff) -> TurnOrchestrator {
        TurnOrchestrator::new(
            registry,
            Arc::new(KeywordIntentClassifier),
            Arc::new(MockAIProvider::new()),
            Arc::new(handoff),
            Arc::new(PromptTemplateStore::built_in()),
        )
        .with_settings(OrchestratorSettings {
            handoff_timeout: Duration::from_secs(1),
            ..fast_settings()
        })
    }

    #[tokio::test]
    async fn cancel_after_escalation_is_stored_still_notifies() {
        let registry = Arc::new(InMemoryCallRegistry::new());
        let handoff = SlowHandoff::default();
        let orchestrator = slow_handoff_orchestrator(registry.clone(), handoff.clone());
        let id = CallId::new("CA1").unwrap();
        registry.create(id.clone(), Scenario::BillingInquiry).await.unwrap();

        let outcome = orchestrator
            .handle_turn_cancellable(
                &id,
                "I want to talk to a human",
                None,
                tokio::time::sleep(Duration::from_millis(20)),
            )
            .await
            .unwrap();

        assert!(outcome.newly_escalated);
        assert_eq!(outcome.handoff.unwrap().position, 1);
        assert!(registry.get(&id).await.unwrap().escalated);
        assert_eq!(*handoff.received.lock().await, vec![id]);
    }

    #[tokio::test]
    async fn dropped_turn_still_delivers_the_handoff() {
        let registry = Arc::new(InMemoryCallRegistry::new());
        let handoff = SlowHandoff::default();
        let orchestrator = slow_handoff_orchestrator(registry.clone(), handoff.clone());
        let id = CallId::new("CA1").unwrap();
        registry.create(id.clone(), Scenario::BillingInquiry).await.unwrap();

        let dropped = tokio::time::timeout(
            Duration::from_millis(20),
            orchestrator.handle_turn(&id, "Transfer me to an agent", None),
        )
        .await;
        assert!(dropped.is_err());

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(registry.get(&id).await.unwrap().escalated);
        assert_eq!(handoff.received.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn unknown_call_and_empty_text_are_rejected() {
        let f = fixture(MockAIProvider::new());
        let missing = CallId::new("nope").unwrap();
        assert_eq!(
            f.orchestrator.handle_turn(&missing, "hi", None).await.unwrap_err(),
            CallError::UnknownCall(missing)
        );

        let id = start(&f, "CA1").await;
        assert!(matches!(
            f.orchestrator.handle_turn(&id, "   ", None).await.unwrap_err(),
            CallError::Validation(_)
        ));
        assert!(f.registry.get(&id).await.unwrap().turn_history.is_empty());
    }

    struct SlowClassifier;

    #[async_trait]
    impl IntentClassifier for SlowClassifier {
        async fn classify(&self, _call_id: &CallId, _history: &[Utterance]) -> IntentClassification {
            tokio::time::sleep(Duration::from_secs(5)).await;
            IntentClassification::new(Intent::BillingQuestion, 0.9)
        }
    }

    #[tokio::test]
    async fn classifier_timeout_degrades_to_unknown() {
        let registry = Arc::new(InMemoryCallRegistry::new());
        let orchestrator = TurnOrchestrator::new(
            registry.clone(),
            Arc::new(SlowClassifier),
            Arc::new(MockAIProvider::new()),
            Arc::new(InMemoryHandoffQueue::default()),
            Arc::new(PromptTemplateStore::built_in()),
        )
        .with_settings(OrchestratorSettings {
            classification_timeout: Duration::from_millis(10),
            ..fast_settings()
        });
        let id = CallId::new("CA1").unwrap();
        registry.create(id.clone(), Scenario::BillingInquiry).await.unwrap();

        let outcome = orchestrator.handle_turn(&id, "My bill", None).await.unwrap();
        assert_eq!(outcome.classification, IntentClassification::unknown());
        assert_eq!(outcome.decision, EscalationDecision::Continue);
    }

    struct FailingHandoff;

    #[async_trait]
    impl HumanHandoff for FailingHandoff {
        async fn request_handoff(&self, _request: HandoffRequest) -> Result<RoutingAck, HandoffError> {
            Err(HandoffError::Unavailable("queue offline".into()))
        }
    }

    #[tokio::test]
    async fn handoff_failure_does_not_fail_the_turn() {
        let registry = Arc::new(InMemoryCallRegistry::new());
        let orchestrator = TurnOrchestrator::new(
            registry.clone(),
            Arc::new(KeywordIntentClassifier),
            Arc::new(MockAIProvider::new()),
            Arc::new(FailingHandoff),
            Arc::new(PromptTemplateStore::built_in()),
        )
        .with_settings(fast_settings());
        let id = CallId::new("CA1").unwrap();
        registry.create(id.clone(), Scenario::InsuranceVerification).await.unwrap();

        let outcome = orchestrator.handle_turn(&id, "Transfer me to an agent", None).await.unwrap();
        assert!(outcome.state.escalated);
        assert!(outcome.handoff.is_none());
    }
}
