//! OpenAI-compatible LLM Gateway implementation

use super::client::{OpenAiClient, OpenAiSettings};
use super::error::{OpenAiError, Result};
use super::session::OpenAiSession;
use crate::config::FileProviderConfig;
use async_trait::async_trait;
use roundtable_application::{GatewayError, LlmGateway, LlmSession};
use roundtable_domain::Model;
use std::sync::Arc;
use tracing::info;

/// LLM Gateway for any endpoint speaking the chat completions API
pub struct OpenAiGateway {
    client: Arc<OpenAiClient>,
}

impl OpenAiGateway {
    pub fn new(settings: OpenAiSettings) -> Result<Self> {
        let client = OpenAiClient::new(settings)?;
        info!("OpenAiGateway initialized for {}", client.base_url());
        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Build from the `[provider]` section, resolving the API key
    pub fn from_config(config: &FileProviderConfig) -> Result<Self> {
        let api_key = config
            .resolve_api_key()
            .ok_or_else(|| OpenAiError::MissingApiKey(config.api_key_env.clone()))?;

        Self::new(OpenAiSettings {
            base_url: config.base_url.clone(),
            api_key,
            timeout: config.timeout(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    async fn create_session(
        &self,
        model: &Model,
    ) -> std::result::Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(OpenAiSession::new(
            Arc::clone(&self.client),
            model.clone(),
            None,
        )))
    }

    async fn create_session_with_system_prompt(
        &self,
        model: &Model,
        system_prompt: &str,
    ) -> std::result::Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(OpenAiSession::new(
            Arc::clone(&self.client),
            model.clone(),
            Some(system_prompt.to_string()),
        )))
    }

    async fn available_models(&self) -> std::result::Result<Vec<Model>, GatewayError> {
        let ids = self.client.list_models().await?;
        Ok(ids.into_iter().map(Model::new).collect())
    }
}
