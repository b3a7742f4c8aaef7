//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `CARECALL` prefix and
//! `__` between nested keys. Every value has a default, so an empty
//! environment yields a runnable demo configuration.
//!
//! # Example
//!
//! ```no_run
//! use carecall::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod ai;
mod conversation;
mod error;
mod server;
mod voice;

pub use ai::{AiConfig, AiProviderKind};
pub use conversation::{ClassifierKind, ConversationConfig};
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};
pub use voice::VoiceConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Language model provider settings
    #[serde(default)]
    pub ai: AiConfig,

    /// Escalation thresholds, retry policy and collaborator timeouts
    #[serde(default)]
    pub conversation: ConversationConfig,

    #[serde(default)]
    pub voice: VoiceConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present
    /// 2. Reads variables with the `CARECALL` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// - `CARECALL__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `CARECALL__CONVERSATION__CLASSIFIER=llm` -> `conversation.classifier`
    ///
    /// The result is validated before it is returned.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config: AppConfig = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CARECALL")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration sections
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.conversation.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        env::remove_var("CARECALL__SERVER__PORT");
        env::remove_var("CARECALL__SERVER__ENVIRONMENT");
        env::remove_var("CARECALL__CONVERSATION__CLASSIFIER");
        env::remove_var("CARECALL__CONVERSATION__MAX_HISTORY_LEN");
        env::remove_var("CARECALL__AI__PROVIDER");
    }

    #[test]
    fn test_load_with_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.ai.provider, AiProviderKind::Mock);
        assert_eq!(config.voice.default_voice_id, "Joanna");
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("CARECALL__SERVER__PORT", "3000");
        env::set_var("CARECALL__CONVERSATION__CLASSIFIER", "llm");
        env::set_var("CARECALL__CONVERSATION__MAX_HISTORY_LEN", "20");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.conversation.classifier, ClassifierKind::Llm);
        assert_eq!(config.conversation.max_history_len, 20);
    }

    #[test]
    fn test_openai_without_key_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("CARECALL__AI__PROVIDER", "openai");
        let result = AppConfig::load();
        clear_env();

        assert!(matches!(result, Err(ConfigError::ValidationFailed(_))));
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("CARECALL__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().is_production());
    }
}
