//! In-Memory Call Registry Adapter
//!
//! Holds every call's state in process memory. Each call carries its own
//! turn mutex, so turns on different calls never wait on each other.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::domain::call::{ConversationState, Scenario, Utterance};
use crate::domain::foundation::CallId;
use crate::ports::{CallRegistry, RegistryError, StateMutator, TurnGuard};

#[derive(Debug)]
struct CallEntry {
    state: ConversationState,
    turn_lock: Arc<Mutex<()>>,
}

/// In-memory call session registry
#[derive(Debug, Clone)]
pub struct InMemoryCallRegistry {
    calls: Arc<RwLock<HashMap<CallId, CallEntry>>>,
    /// Ended calls whose id was reused by a later call.
    archive: Arc<RwLock<Vec<ConversationState>>>,
}

impl InMemoryCallRegistry {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(HashMap::new())),
            archive: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Number of calls with a current state
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    pub async fn archived_count(&self) -> usize {
        self.archive.read().await.len()
    }
}

impl Default for InMemoryCallRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CallRegistry for InMemoryCallRegistry {
    async fn create(&self, call_id: CallId, scenario: Scenario) -> Result<ConversationState, RegistryError> {
        let mut calls = self.calls.write().await;
        let state = ConversationState::new(call_id.clone(), scenario);

        match calls.get_mut(&call_id) {
            Some(entry) if !entry.state.ended => Err(RegistryError::DuplicateCall(call_id)),
            Some(entry) => {
                let previous = std::mem::replace(&mut entry.state, state.clone());
                self.archive.write().await.push(previous);
                tracing::debug!(call_id = %call_id, "archived ended call before reuse of its id");
                Ok(state)
            }
            None => {
                calls.insert(
                    call_id,
                    CallEntry {
                        state: state.clone(),
                        turn_lock: Arc::new(Mutex::new(())),
                    },
                );
                Ok(state)
            }
        }
    }

    async fn get(&self, call_id: &CallId) -> Result<ConversationState, RegistryError> {
        let calls = self.calls.read().await;
        calls
            .get(call_id)
            .map(|entry| entry.state.clone())
            .ok_or_else(|| RegistryError::UnknownCall(call_id.clone()))
    }

    async fn append_turn(&self, call_id: &CallId, utterance: Utterance) -> Result<ConversationState, RegistryError> {
        let mut calls = self.calls.write().await;
        let entry = calls
            .get_mut(call_id)
            .ok_or_else(|| RegistryError::UnknownCall(call_id.clone()))?;

        entry
            .state
            .append(utterance)
            .map_err(|_| RegistryError::CallEnded(call_id.clone()))?;
        Ok(entry.state.clone())
    }

    async fn update(&self, call_id: &CallId, mutator: StateMutator) -> Result<ConversationState, RegistryError> {
        let mut calls = self.calls.write().await;
        let entry = calls
            .get_mut(call_id)
            .ok_or_else(|| RegistryError::UnknownCall(call_id.clone()))?;

        if entry.state.ended {
            return Err(RegistryError::CallEnded(call_id.clone()));
        }

        let mut candidate = entry.state.clone();
        mutator(&mut candidate);
        candidate
            .validate_successor_of(&entry.state)
            .map_err(|reason| RegistryError::InvariantViolation {
                call_id: call_id.clone(),
                reason,
            })?;

        entry.state = candidate;
        Ok(entry.state.clone())
    }

    async fn lock(&self, call_id: &CallId) -> Result<TurnGuard, RegistryError> {
        let turn_lock = {
            let calls = self.calls.read().await;
            calls
                .get(call_id)
                .map(|entry| Arc::clone(&entry.turn_lock))
                .ok_or_else(|| RegistryError::UnknownCall(call_id.clone()))?
        };
        // Map lock is released before waiting on the call's own mutex.
        let guard = turn_lock.lock_owned().await;
        Ok(TurnGuard::new(call_id.clone(), guard))
    }

    async fn list(&self) -> Result<Vec<ConversationState>, RegistryError> {
        let calls = self.calls.read().await;
        let archive = self.archive.read().await;
        let mut states: Vec<ConversationState> = archive.iter().cloned().collect();
        states.extend(calls.values().map(|entry| entry.state.clone()));
        states.sort_by_key(|s| s.created_at);
        Ok(states)
    }
}
