//! Prompt domain
//!
//! Templates for participant turns, the forced final round and the
//! consensus scorer.

mod template;

pub use template::PromptTemplate;
