//! StartCallHandler - begins tracking a call.

use std::sync::Arc;

use crate::audit;
use crate::domain::call::{CallError, ConversationState, PromptTemplateStore, Scenario};
use crate::domain::foundation::CallId;
use crate::ports::CallRegistry;

/// Command to start a call.
#[derive(Debug, Clone)]
pub struct StartCallCommand {
    /// Provider call id; a simulation id is generated when absent.
    pub call_id: Option<String>,
    /// Scenario tag, e.g. `billing_inquiry`.
    pub scenario: String,
}

pub struct StartCallHandler {
    registry: Arc<dyn CallRegistry>,
    templates: Arc<PromptTemplateStore>,
}

impl StartCallHandler {
    pub fn new(registry: Arc<dyn CallRegistry>, templates: Arc<PromptTemplateStore>) -> Self {
        Self { registry, templates }
    }

    pub async fn handle(&self, cmd: StartCallCommand) -> Result<ConversationState, CallError> {
        let scenario: Scenario = cmd
            .scenario
            .parse()
            .map_err(|_| CallError::UnknownScenario(cmd.scenario.clone()))?;
        // every startable scenario needs a prompt
        self.templates.get(scenario)?;

        let call_id = match cmd.call_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => CallId::new(id)?,
            _ => CallId::generate(),
        };

        let state = self.registry.create(call_id, scenario).await?;
        audit::call_started(&state.call_id, scenario);
        Ok(state)
    }
}
