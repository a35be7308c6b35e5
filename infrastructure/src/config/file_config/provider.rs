//! Provider configuration from TOML (`[provider]` section)

use roundtable_domain::Model;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Base URL of the API, without the `/chat/completions` suffix
    pub base_url: String,
    /// Environment variable holding the API key (default: "OPENAI_API_KEY")
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead)
    pub api_key: Option<String>,
    /// Model that plays every participant role
    pub participant_model: String,
    /// Model that scores consensus after each round
    pub scorer_model: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Sampling temperature passed through to the provider
    pub temperature: Option<f32>,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            participant_model: Model::DEFAULT.to_string(),
            scorer_model: Model::DEFAULT.to_string(),
            timeout_secs: 120,
            temperature: None,
        }
    }
}

impl FileProviderConfig {
    pub fn participant_model(&self) -> Model {
        Model::new(self.participant_model.trim())
    }

    pub fn scorer_model(&self) -> Model {
        Model::new(self.scorer_model.trim())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The direct key if set, otherwise the value of `api_key_env`
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }
}
