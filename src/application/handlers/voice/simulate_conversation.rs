//! SimulateConversationHandler - runs a scripted caller through the orchestrator.

use serde::Serialize;
use std::sync::Arc;

use crate::application::handlers::calls::{StartCallCommand, StartCallHandler};
use crate::application::orchestrator::TurnOrchestrator;
use crate::domain::call::{CallError, EscalationDecision, Intent, Utterance};
use crate::domain::foundation::CallId;

#[derive(Debug, Clone)]
pub struct SimulateConversationCommand {
    pub scenario: String,
    pub utterances: Vec<String>,
}

/// One simulated turn.
#[derive(Debug, Clone, Serialize)]
pub struct SimulatedTurn {
    pub caller: String,
    pub reply: String,
    pub intent: Intent,
    pub confidence: f32,
    pub decision: EscalationDecision,
}

/// Why a simulation stopped before its script ran out.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationFailure {
    pub turn_index: usize,
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    pub call_id: CallId,
    pub transcript: Vec<Utterance>,
    pub decisions: Vec<SimulatedTurn>,
    pub final_decision: Option<EscalationDecision>,
    pub escalated: bool,
    pub ended: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SimulationFailure>,
}

pub struct SimulateConversationHandler {
    start_call: StartCallHandler,
    orchestrator: Arc<TurnOrchestrator>,
}

impl SimulateConversationHandler {
    pub fn new(orchestrator: Arc<TurnOrchestrator>) -> Self {
        Self {
            start_call: StartCallHandler::new(
                orchestrator.registry().clone(),
                orchestrator.templates().clone(),
            ),
            orchestrator,
        }
    }

    /// Start a fresh call and feed it the script.
    ///
    /// Stops early when a turn escalates or ends the call. A failing turn
    /// stops the run and is reported in the result rather than as an error;
    /// only failing to start the call is an error.
    pub async fn handle(&self, cmd: SimulateConversationCommand) -> Result<SimulationResult, CallError> {
        let state = self
            .start_call
            .handle(StartCallCommand {
                call_id: None,
                scenario: cmd.scenario,
            })
            .await?;
        let call_id = state.call_id;

        let mut decisions = Vec::new();
        let mut error = None;

        for (turn_index, text) in cmd.utterances.iter().enumerate() {
            match self.orchestrator.handle_turn(&call_id, text, None).await {
                Ok(outcome) => {
                    decisions.push(SimulatedTurn {
                        caller: text.clone(),
                        reply: outcome.reply,
                        intent: outcome.classification.intent,
                        confidence: outcome.classification.confidence,
                        decision: outcome.decision,
                    });
                    if outcome.decision != EscalationDecision::Continue {
                        break;
                    }
                }
                Err(err) => {
                    tracing::warn!(call_id = %call_id, turn_index, error = %err, "simulation stopped");
                    error = Some(SimulationFailure {
                        turn_index,
                        code: err.code(),
                        message: err.to_string(),
                    });
                    break;
                }
            }
        }

        let state = self.orchestrator.registry().get(&call_id).await?;
        Ok(SimulationResult {
            call_id,
            final_decision: decisions.last().map(|d| d.decision),
            transcript: state.turn_history,
            decisions,
            escalated: state.escalated,
            ended: state.ended,
            error,
        })
    }
}
