//! OpenAI-compatible adapter
//!
//! Implements the [`LlmGateway`](roundtable_application::LlmGateway) port
//! over the chat completions HTTP API. Works with OpenAI itself and with any
//! server exposing the same endpoints (local model servers, proxies).

pub mod client;
pub mod error;
pub mod gateway;
pub mod protocol;
pub mod session;
