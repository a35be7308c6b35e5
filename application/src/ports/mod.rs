//! Port definitions (interfaces for external systems)

pub mod conversation_logger;
pub mod llm_gateway;
pub mod participant;
pub mod progress;
