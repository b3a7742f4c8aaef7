//! Turn orchestration configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;

/// Thresholds and timings for the turn orchestrator
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationConfig {
    /// Turn history length at which a call is handed to a human
    #[serde(default = "default_max_history_len")]
    pub max_history_len: usize,

    /// Consecutive `unknown` intents that trigger escalation
    #[serde(default = "default_max_consecutive_unknown")]
    pub max_consecutive_unknown: usize,

    /// Minimum confidence for an `end_call` intent to end the call
    #[serde(default = "default_end_call_threshold")]
    pub end_call_threshold: f32,

    #[serde(default)]
    pub classifier: ClassifierKind,

    /// Timeout for each individual collaborator call
    #[serde(default = "default_collaborator_timeout_ms")]
    pub collaborator_timeout_ms: u64,

    /// Total generation attempts per turn, including the first
    #[serde(default = "default_generation_max_attempts")]
    pub generation_max_attempts: u32,

    #[serde(default = "default_retry_initial_backoff_ms")]
    pub retry_initial_backoff_ms: u64,

    /// YAML file with prompt templates overriding the built-in set
    pub prompt_templates_path: Option<PathBuf>,

    /// Calls running longer than this are flagged as overdue
    #[serde(default = "default_max_call_duration_secs")]
    pub max_call_duration_secs: u64,
}

/// Which intent classifier the orchestrator consults
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    #[default]
    Keyword,
    Llm,
}

impl ConversationConfig {
    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_millis(self.collaborator_timeout_ms)
    }

    pub fn retry_initial_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_initial_backoff_ms)
    }

    pub fn max_call_duration(&self) -> Duration {
        Duration::from_secs(self.max_call_duration_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_history_len < 2 {
            return Err(ValidationError::InvalidHistoryLimit);
        }
        if self.max_consecutive_unknown == 0 {
            return Err(ValidationError::InvalidUnknownLimit);
        }
        if !(0.0..=1.0).contains(&self.end_call_threshold) {
            return Err(ValidationError::InvalidConfidenceThreshold);
        }
        if self.generation_max_attempts == 0 {
            return Err(ValidationError::InvalidRetryAttempts);
        }
        if self.collaborator_timeout_ms == 0 {
            return Err(ValidationError::InvalidCollaboratorTimeout);
        }
        Ok(())
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_history_len: default_max_history_len(),
            max_consecutive_unknown: default_max_consecutive_unknown(),
            end_call_threshold: default_end_call_threshold(),
            classifier: ClassifierKind::default(),
            collaborator_timeout_ms: default_collaborator_timeout_ms(),
            generation_max_attempts: default_generation_max_attempts(),
            retry_initial_backoff_ms: default_retry_initial_backoff_ms(),
            prompt_templates_path: None,
            max_call_duration_secs: default_max_call_duration_secs(),
        }
    }
}

fn default_max_history_len() -> usize {
    12
}

fn default_max_consecutive_unknown() -> usize {
    2
}

fn default_end_call_threshold() -> f32 {
    0.7
}

fn default_collaborator_timeout_ms() -> u64 {
    10_000
}

fn default_generation_max_attempts() -> u32 {
    2
}

fn default_retry_initial_backoff_ms() -> u64 {
    250
}

fn default_max_call_duration_secs() -> u64 {
    1800
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_defaults() {
        let config = ConversationConfig::default();
        assert_eq!(config.max_history_len, 12);
        assert_eq!(config.max_consecutive_unknown, 2);
        assert_eq!(config.generation_max_attempts, 2);
        assert_eq!(config.classifier, ClassifierKind::Keyword);
        assert_eq!(config.collaborator_timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_attempts() {
        let config = ConversationConfig {
            generation_max_attempts: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidRetryAttempts));
    }

    #[test]
    fn test_rejects_threshold_out_of_range() {
        let config = ConversationConfig {
            end_call_threshold: 1.5,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidConfidenceThreshold)
        );
    }
}
