//! Chat session over an OpenAI-compatible endpoint.
//!
//! The API is stateless, so [`OpenAiSession`] keeps the message history
//! itself and resends it with every request.

use super::client::OpenAiClient;
use super::error::Result;
use super::protocol::ChatMessage;
use async_trait::async_trait;
use roundtable_application::{GatewayError, LlmSession};
use roundtable_domain::Model;
use std::sync::{Arc, Mutex};
use tracing::debug;

pub struct OpenAiSession {
    client: Arc<OpenAiClient>,
    model: Model,
    history: Mutex<Vec<ChatMessage>>,
}

impl OpenAiSession {
    pub fn new(client: Arc<OpenAiClient>, model: Model, system_prompt: Option<String>) -> Self {
        let history = system_prompt
            .map(ChatMessage::system)
            .into_iter()
            .collect();
        Self {
            client,
            model,
            history: Mutex::new(history),
        }
    }

    /// Messages to send for `content`: the history so far plus a new user turn
    fn messages_for(&self, content: &str) -> Vec<ChatMessage> {
        let mut messages = self.history.lock().map(|h| h.clone()).unwrap_or_default();
        messages.push(ChatMessage::user(content));
        messages
    }

    /// Send a prompt and record the exchange once the reply arrives
    pub async fn ask(&self, content: &str) -> Result<String> {
        let messages = self.messages_for(content);
        debug!(
            "Sending to {} ({} messages in history)",
            self.model,
            messages.len()
        );

        let reply = self.client.chat(self.model.as_str(), &messages).await?;

        if let Ok(mut history) = self.history.lock() {
            history.push(ChatMessage::user(content));
            history.push(ChatMessage::assistant(reply.clone()));
        }
        Ok(reply)
    }

    pub fn history_len(&self) -> usize {
        self.history.lock().map(|h| h.len()).unwrap_or(0)
    }
}

#[async_trait]
impl LlmSession for OpenAiSession {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn send(&self, content: &str) -> std::result::Result<String, GatewayError> {
        self.ask(content).await.map_err(GatewayError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::client::OpenAiSettings;
    use crate::openai::protocol::ChatRole;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: String) -> Arc<OpenAiClient> {
        Arc::new(
            OpenAiClient::new(OpenAiSettings {
                base_url,
                api_key: "sk-test".to_string(),
                timeout: Duration::from_secs(5),
                temperature: None,
            })
            .unwrap(),
        )
    }

    async fn reply_once(server: &MockServer, content: &str) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"choices": [{"message": {"content": content}}]})),
            )
            .up_to_n_times(1)
            .expect(1)
            .mount(server)
            .await;
    }

    #[test]
    fn test_system_prompt_leads_history() {
        let session = OpenAiSession::new(
            client("http://127.0.0.1:9".to_string()),
            Model::default(),
            Some("You are QA.".to_string()),
        );
        let messages = session.messages_for("Round 1");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[1], ChatMessage::user("Round 1"));
    }

    #[tokio::test]
    async fn test_history_is_resent() {
        let server = MockServer::start().await;
        reply_once(&server, "First.").await;
        reply_once(&server, "Second.").await;
        let session = OpenAiSession::new(client(server.uri()), Model::new("m"), None);

        assert_eq!(session.send("one").await.unwrap(), "First.");
        assert_eq!(session.send("two").await.unwrap(), "Second.");
        assert_eq!(session.history_len(), 4);

        let requests = server.received_requests().await.unwrap();
        let second: serde_json::Value = requests[1].body_json().unwrap();
        let sent: Vec<(&str, &str)> = second["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| (m["role"].as_str().unwrap(), m["content"].as_str().unwrap()))
            .collect();
        assert_eq!(
            sent,
            vec![("user", "one"), ("assistant", "First."), ("user", "two")]
        );
    }

    #[tokio::test]
    async fn test_failed_send_leaves_history_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;
        let session = OpenAiSession::new(client(server.uri()), Model::new("m"), None);

        let result = session.send("one").await;
        assert!(matches!(result, Err(GatewayError::RequestFailed(_))));
        assert_eq!(session.history_len(), 0);
    }
}
