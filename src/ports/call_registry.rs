//! Call Registry Port - ownership of per-call conversation state.
//!
//! The registry is the only owner of [`ConversationState`]. Callers get
//! snapshots; every change goes through `append_turn` or `update`, each of
//! which is atomic for its call. Turn-level exclusivity is separate: a
//! caller that needs several steps without interleaving takes the call's
//! [`TurnGuard`] via `lock` first.

use async_trait::async_trait;
use tokio::sync::OwnedMutexGuard;

use crate::domain::call::{CallError, ConversationState, Scenario, Utterance};
use crate::domain::foundation::CallId;

/// Mutation applied by [`CallRegistry::update`].
pub type StateMutator = Box<dyn FnOnce(&mut ConversationState) + Send>;

/// Errors from registry operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("Call {0} not found")]
    UnknownCall(CallId),

    #[error("Call {0} already exists and has not ended")]
    DuplicateCall(CallId),

    #[error("Call {0} has ended")]
    CallEnded(CallId),

    #[error("Rejected mutation of call {call_id}: {reason}")]
    InvariantViolation { call_id: CallId, reason: String },
}

impl From<RegistryError> for CallError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownCall(id) => CallError::UnknownCall(id),
            RegistryError::DuplicateCall(id) => CallError::DuplicateCall(id),
            RegistryError::CallEnded(id) => CallError::CallEnded(id),
            RegistryError::InvariantViolation { call_id, reason } => {
                CallError::InvariantViolation { call_id, reason }
            }
        }
    }
}

/// Exclusive right to run a turn on one call. Released on drop.
#[derive(Debug)]
pub struct TurnGuard {
    call_id: CallId,
    _guard: OwnedMutexGuard<()>,
}

impl TurnGuard {
    pub fn new(call_id: CallId, guard: OwnedMutexGuard<()>) -> Self {
        Self {
            call_id,
            _guard: guard,
        }
    }

    pub fn call_id(&self) -> &CallId {
        &self.call_id
    }
}

/// Port for the process-wide call session registry.
#[async_trait]
pub trait CallRegistry: Send + Sync {
    /// Start tracking a call.
    ///
    /// Fails with `DuplicateCall` while a live state exists for the id. An
    /// ended state with the same id is archived, not overwritten.
    async fn create(&self, call_id: CallId, scenario: Scenario) -> Result<ConversationState, RegistryError>;

    /// Snapshot of a call's current state.
    async fn get(&self, call_id: &CallId) -> Result<ConversationState, RegistryError>;

    /// Append one utterance. Fails with `CallEnded` once the call has ended.
    async fn append_turn(&self, call_id: &CallId, utterance: Utterance) -> Result<ConversationState, RegistryError>;

    /// Atomic read-modify-write.
    ///
    /// The mutated state must be a legal successor of the current one
    /// (see [`ConversationState::validate_successor_of`]); otherwise the
    /// stored state is left untouched and `InvariantViolation` is returned.
    async fn update(&self, call_id: &CallId, mutator: StateMutator) -> Result<ConversationState, RegistryError>;

    /// Acquire exclusive turn access to one call.
    ///
    /// Waits for any turn already running on the same call. Calls never
    /// contend with each other.
    async fn lock(&self, call_id: &CallId) -> Result<TurnGuard, RegistryError>;

    /// Every known state: live calls and archived ones.
    async fn list(&self) -> Result<Vec<ConversationState>, RegistryError>;
}
