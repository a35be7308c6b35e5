//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod discussion;
mod output;
mod provider;

pub use discussion::FileDiscussionConfig;
pub use output::FileOutputConfig;
pub use provider::FileProviderConfig;

use serde::{Deserialize, Serialize};

/// Longest discussion accepted without a warning
const LONG_DISCUSSION_ROUNDS: u32 = 12;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The configuration cannot work at all.
    Error,
    /// The configuration works but may not behave as expected.
    Warning,
}

/// A detected issue in the loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    /// Dotted path of the offending key, e.g. `discussion.max_rounds`
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field: field.to_string(),
            message: message.into(),
        }
    }

    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Round control
    pub discussion: FileDiscussionConfig,
    /// Chat completions endpoint and models
    pub provider: FileProviderConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let d = &self.discussion;

        if d.min_rounds == 0 {
            issues.push(ConfigIssue::error(
                "discussion.min_rounds",
                "must be at least 1",
            ));
        }
        if d.min_rounds > d.max_rounds {
            issues.push(ConfigIssue::error(
                "discussion.max_rounds",
                format!(
                    "must not be below min_rounds ({} < {})",
                    d.max_rounds, d.min_rounds
                ),
            ));
        }
        if d.consensus_threshold > 100 {
            issues.push(ConfigIssue::error(
                "discussion.consensus_threshold",
                format!("must be 0-100, got {}", d.consensus_threshold),
            ));
        }
        if d.max_rounds > LONG_DISCUSSION_ROUNDS {
            issues.push(ConfigIssue::warning(
                "discussion.max_rounds",
                format!(
                    "{} rounds is unusually long; every round sends the growing transcript to each participant",
                    d.max_rounds
                ),
            ));
        }

        let p = &self.provider;
        if !(p.base_url.starts_with("http://") || p.base_url.starts_with("https://")) {
            issues.push(ConfigIssue::error(
                "provider.base_url",
                format!("'{}' is not an http(s) URL", p.base_url),
            ));
        }
        if p.api_key_env.trim().is_empty() && p.api_key.is_none() {
            issues.push(ConfigIssue::error(
                "provider.api_key_env",
                "must name an environment variable when api_key is not set",
            ));
        }
        if p.participant_model.trim().is_empty() {
            issues.push(ConfigIssue::error(
                "provider.participant_model",
                "must not be empty",
            ));
        }
        if p.scorer_model.trim().is_empty() {
            issues.push(ConfigIssue::error("provider.scorer_model", "must not be empty"));
        }
        if p.timeout_secs == 0 {
            issues.push(ConfigIssue::error("provider.timeout_secs", "must be at least 1"));
        }
        if let Some(t) = p.temperature
            && !(0.0..=2.0).contains(&t)
        {
            issues.push(ConfigIssue::warning(
                "provider.temperature",
                format!("{} is outside the usual 0.0-2.0 range", t),
            ));
        }

        issues
    }
}
