//! Infrastructure layer for roundtable
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod openai;

// Re-export commonly used types
pub use config::{
    ConfigIssue, ConfigLoadError, ConfigLoader, FileConfig, FileDiscussionConfig,
    FileOutputConfig, FileProviderConfig, Severity,
};
pub use logging::JsonlConversationLogger;
pub use openai::{
    client::{OpenAiClient, OpenAiSettings},
    error::OpenAiError,
    gateway::OpenAiGateway,
    session::OpenAiSession,
};
