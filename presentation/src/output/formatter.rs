//! Output formatter trait

use roundtable_domain::{DiscussionRecord, OutputFormat};

/// Trait for rendering a finished discussion
pub trait OutputFormatter {
    /// Topic, rounds, final metrics and consensus status
    fn format_summary(&self, record: &DiscussionRecord) -> String;

    /// Every turn grouped by round, with per-round metrics
    fn format_transcript(&self, record: &DiscussionRecord) -> String;

    /// The record serialized as JSON
    fn format_json(&self, record: &DiscussionRecord) -> String;

    fn render(&self, record: &DiscussionRecord, format: OutputFormat) -> String {
        match format {
            OutputFormat::Summary => self.format_summary(record),
            OutputFormat::Transcript => self.format_transcript(record),
            OutputFormat::Json => self.format_json(record),
        }
    }
}
