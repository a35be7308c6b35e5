//! Error types for the OpenAI-compatible adapter

use super::protocol::ErrorEnvelope;
use roundtable_application::GatewayError;
use thiserror::Error;

/// Result type alias for OpenAI adapter operations
pub type Result<T> = std::result::Result<T, OpenAiError>;

/// Longest slice of a raw error body kept in messages
const MAX_ERROR_BODY: usize = 300;

/// Errors that can occur when talking to a chat completions endpoint
#[derive(Error, Debug)]
pub enum OpenAiError {
    #[error("API key not found (set {0} or provider.api_key)")]
    MissingApiKey(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Response contained no message content")]
    EmptyContent,

    #[error("Request timeout")]
    Timeout,
}

impl OpenAiError {
    /// Classify a non-success response by status code and body
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = error_message(body);
        match status {
            401 | 403 => OpenAiError::Authentication(message),
            404 => OpenAiError::ModelNotFound(message),
            429 => OpenAiError::RateLimited(message),
            _ => OpenAiError::Status { status, message },
        }
    }
}

/// The `error.message` of a JSON error body, else the raw body truncated
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => body.trim().chars().take(MAX_ERROR_BODY).collect(),
    }
}

impl From<OpenAiError> for GatewayError {
    fn from(e: OpenAiError) -> Self {
        match e {
            OpenAiError::MissingApiKey(_) | OpenAiError::Authentication(_) => {
                GatewayError::ConnectionError(e.to_string())
            }
            OpenAiError::Http(ref inner) if inner.is_timeout() => GatewayError::Timeout,
            OpenAiError::Http(ref inner) if inner.is_connect() => {
                GatewayError::ConnectionError(e.to_string())
            }
            OpenAiError::ModelNotFound(message) => GatewayError::ModelNotAvailable(message),
            OpenAiError::EmptyContent => GatewayError::EmptyResponse,
            OpenAiError::Timeout => GatewayError::Timeout,
            other => GatewayError::RequestFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            OpenAiError::from_status(401, "nope"),
            OpenAiError::Authentication(_)
        ));
        assert!(matches!(
            OpenAiError::from_status(429, "{}"),
            OpenAiError::RateLimited(_)
        ));
        assert!(matches!(
            OpenAiError::from_status(500, "boom"),
            OpenAiError::Status { status: 500, .. }
        ));
    }

    #[test]
    fn test_json_error_message_is_extracted() {
        let body = r#"{"error": {"message": "The model `gpt-9` does not exist"}}"#;
        match OpenAiError::from_status(404, body) {
            OpenAiError::ModelNotFound(message) => {
                assert_eq!(message, "The model `gpt-9` does not exist")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_raw_body_is_truncated() {
        let body = "x".repeat(1000);
        match OpenAiError::from_status(502, &body) {
            OpenAiError::Status { message, .. } => assert_eq!(message.len(), MAX_ERROR_BODY),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_gateway_error_mapping() {
        assert!(matches!(
            GatewayError::from(OpenAiError::EmptyContent),
            GatewayError::EmptyResponse
        ));
        assert!(matches!(
            GatewayError::from(OpenAiError::Timeout),
            GatewayError::Timeout
        ));
        assert!(matches!(
            GatewayError::from(OpenAiError::ModelNotFound("gpt-9".into())),
            GatewayError::ModelNotAvailable(m) if m == "gpt-9"
        ));
        assert!(matches!(
            GatewayError::from(OpenAiError::MissingApiKey("OPENAI_API_KEY".into())),
            GatewayError::ConnectionError(_)
        ));
        assert!(matches!(
            GatewayError::from(OpenAiError::RateLimited("slow down".into())),
            GatewayError::RequestFailed(_)
        ));
    }
}
