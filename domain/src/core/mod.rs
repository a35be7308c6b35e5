//! Core domain concepts shared across all subdomains.
//!
//! - [`topic::Topic`]: a validated discussion topic
//! - [`model::Model`]: identifier of the text-generation model behind a role
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod model;
pub mod string;
pub mod topic;
