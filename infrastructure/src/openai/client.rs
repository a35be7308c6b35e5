//! HTTP client for an OpenAI-compatible API

use super::error::{OpenAiError, Result};
use super::protocol::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ModelList};
use std::time::Duration;
use tracing::{debug, trace};

/// Connection settings for [`OpenAiClient`]
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
    pub temperature: Option<f32>,
}

/// Thin wrapper over `reqwest::Client` bound to one endpoint and key
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    temperature: Option<f32>,
}

impl OpenAiClient {
    pub fn new(settings: OpenAiSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key,
            temperature: settings.temperature,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one chat completion and return the first choice's content
    pub async fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatCompletionRequest {
            model,
            messages,
            temperature: self.temperature,
        };
        debug!("POST {} (model {}, {} messages)", url, model, messages.len());

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(Self::classify)?;

        let status = response.status();
        let body = response.text().await.map_err(Self::classify)?;
        trace!("chat completion response ({}): {}", status, body);

        if !status.is_success() {
            return Err(OpenAiError::from_status(status.as_u16(), &body));
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&body).map_err(|e| OpenAiError::Parse(e.to_string()))?;
        match parsed.first_content() {
            Some(content) if !content.trim().is_empty() => Ok(content.to_string()),
            _ => Err(OpenAiError::EmptyContent),
        }
    }

    /// Model identifiers the endpoint advertises
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(Self::classify)?;

        let status = response.status();
        let body = response.text().await.map_err(Self::classify)?;
        if !status.is_success() {
            return Err(OpenAiError::from_status(status.as_u16(), &body));
        }

        let list: ModelList =
            serde_json::from_str(&body).map_err(|e| OpenAiError::Parse(e.to_string()))?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }

    fn classify(e: reqwest::Error) -> OpenAiError {
        if e.is_timeout() {
            OpenAiError::Timeout
        } else {
            OpenAiError::Http(e)
        }
    }
}
