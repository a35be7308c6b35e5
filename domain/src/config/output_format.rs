//! Output format value object

use serde::{Deserialize, Serialize};

/// How a finished discussion is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Topic, round count, final metrics and consensus status (default)
    #[default]
    Summary,
    /// Every turn grouped by round, with per-round metrics
    Transcript,
    /// The full discussion record as JSON
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Summary => "summary",
            OutputFormat::Transcript => "transcript",
            OutputFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "summary" => Ok(OutputFormat::Summary),
            "transcript" | "full" => Ok(OutputFormat::Transcript),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_summary() {
        assert_eq!(OutputFormat::default(), OutputFormat::Summary);
    }

    #[test]
    fn test_serialize_lowercase() {
        let json = serde_json::to_string(&OutputFormat::Transcript).unwrap();
        assert_eq!(json, "\"transcript\"");
    }

    #[test]
    fn test_parse_accepts_full_alias() {
        assert_eq!("Full".parse::<OutputFormat>(), Ok(OutputFormat::Transcript));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
