//! Console output formatter for discussion records

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use roundtable_domain::{ConsensusMetrics, DiscussionRecord, TerminationReason};

/// Formats discussion records for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Topic, rounds, final metrics and consensus status
    pub fn format_summary(record: &DiscussionRecord) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Roundtable Discussion"));
        output.push('\n');
        output.push_str(&format!(
            "{} {}\n",
            "Topic:".cyan().bold(),
            record.topic.content()
        ));
        output.push_str(&format!(
            "{} {} ({} turns)\n",
            "Rounds:".cyan().bold(),
            record.current_round,
            record.rounds.len()
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Outcome:".cyan().bold(),
            Self::outcome(record)
        ));

        let scores: Vec<String> = record
            .consensus_history
            .iter()
            .map(|m| m.agreement_score.to_string())
            .collect();
        if !scores.is_empty() {
            output.push_str(&format!(
                "{} {}\n",
                "Agreement by round:".cyan().bold(),
                scores.join(" -> ")
            ));
        }

        match record.final_metrics() {
            Some(metrics) => {
                output.push_str(&Self::section_header("Final Assessment"));
                output.push_str(&Self::metrics_block(metrics));
            }
            None => {
                output.push_str(&format!(
                    "\n{}\n",
                    "No round was evaluated before the discussion closed.".dimmed()
                ));
            }
        }

        if let Some(last_round) = record.round_numbers().last().copied() {
            output.push_str(&Self::section_header(&format!(
                "Closing statements (round {})",
                last_round
            )));
            for turn in record.turns_in_round(last_round) {
                output.push_str(&format!(
                    "\n{}\n{}\n",
                    format!("-- {} --", turn.speaker_name).yellow().bold(),
                    Self::indent(&turn.content, "  ")
                ));
            }
        }

        output.push_str(&Self::footer());
        output
    }

    /// Every turn grouped by round, with that round's metrics
    pub fn format_transcript(record: &DiscussionRecord) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Roundtable Transcript"));
        output.push('\n');
        output.push_str(&format!(
            "{} {}\n",
            "Topic:".cyan().bold(),
            record.topic.content()
        ));

        for round in record.round_numbers() {
            let forced = record.was_forced() && round == record.current_round;
            let title = if forced {
                format!("Round {} (forced final round)", round)
            } else {
                format!("Round {}", round)
            };
            output.push_str(&Self::section_header(&title));

            for turn in record.turns_in_round(round) {
                output.push_str(&format!(
                    "\n{}\n{}\n",
                    format!("-- {} --", turn.speaker_name).yellow().bold(),
                    turn.content
                ));
            }

            // consensus_history[i] belongs to round i + 1
            if let Some(metrics) = round
                .checked_sub(1)
                .and_then(|i| record.consensus_history.get(i as usize))
            {
                output.push_str(&format!("\n{}\n", "Assessment:".magenta().bold()));
                output.push_str(&Self::metrics_block(metrics));
            }
        }

        output.push_str(&format!(
            "\n{} {}\n",
            "Outcome:".cyan().bold(),
            Self::outcome(record)
        ));
        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(record: &DiscussionRecord) -> String {
        serde_json::to_string_pretty(record).unwrap_or_else(|_| "{}".to_string())
    }

    fn outcome(record: &DiscussionRecord) -> String {
        match record.termination {
            TerminationReason::Consensus => format!(
                "{} after round {}",
                "consensus reached".green().bold(),
                record.current_round
            ),
            TerminationReason::ForcedFinalRound => format!(
                "{} (decision forced in round {})",
                "agreement forced".yellow().bold(),
                record.current_round
            ),
            TerminationReason::RoundLimit => format!(
                "{} after {} rounds",
                "no consensus".red().bold(),
                record.current_round
            ),
        }
    }

    fn metrics_block(metrics: &ConsensusMetrics) -> String {
        let mut block = format!(
            "  Agreement:  {}/100\n  Confidence: {}/100\n  Phase:      {}\n",
            metrics.agreement_score, metrics.confidence_level, metrics.discussion_phase
        );

        if !metrics.unresolved_issues.is_empty() {
            block.push_str(&format!("  {}\n", "Unresolved issues:".yellow()));
            for issue in &metrics.unresolved_issues {
                block.push_str(&format!("    * {}\n", issue));
            }
        }
        if !metrics.conflicting_positions.is_empty() {
            block.push_str(&format!("  {}\n", "Conflicting positions:".red()));
            for (role, positions) in &metrics.conflicting_positions {
                block.push_str(&format!("    {}: {}\n", role, positions.join("; ")));
            }
        }
        block
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_summary(&self, record: &DiscussionRecord) -> String {
        Self::format_summary(record)
    }

    fn format_transcript(&self, record: &DiscussionRecord) -> String {
        Self::format_transcript(record)
    }

    fn format_json(&self, record: &DiscussionRecord) -> String {
        Self::format_json(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_domain::{
        DiscussionPhase, DynamicRoundConfig, OutputFormat, RoleRoster, Topic, Turn,
    };
    use std::collections::BTreeMap;

    fn record(termination: TerminationReason) -> DiscussionRecord {
        let mut conflicts = BTreeMap::new();
        conflicts.insert(
            "security".to_string(),
            vec!["Tokens must not be stored client-side".to_string()],
        );
        DiscussionRecord {
            topic: Topic::try_new("Session storage").unwrap(),
            config: DynamicRoundConfig::default(),
            roster: RoleRoster::default(),
            rounds: vec![
                Turn::new(1, "Architect", "architect", "Use Postgres."),
                Turn::new(1, "Security Engineer", "security", "Encrypt at rest."),
                Turn::new(2, "Decision Maker", "decision_maker", "We go with Postgres."),
            ],
            consensus_history: vec![ConsensusMetrics::new(
                35,
                vec!["storage".to_string()],
                conflicts,
                50,
                DiscussionPhase::Alignment,
            )],
            current_round: 2,
            consensus_reached: termination != TerminationReason::RoundLimit,
            termination,
            started_at: chrono::Utc::now(),
            finished_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_summary_shows_outcome_and_final_metrics() {
        let text = ConsoleFormatter::format_summary(&record(TerminationReason::ForcedFinalRound));
        assert!(text.contains("Session storage"));
        assert!(text.contains("agreement forced"));
        assert!(text.contains("35/100"));
        assert!(text.contains("* storage"));
        assert!(text.contains("security: Tokens must not be stored client-side"));
        assert!(text.contains("We go with Postgres."));
        assert!(!text.contains("Encrypt at rest."));
    }

    #[test]
    fn test_transcript_groups_turns_by_round() {
        let text = ConsoleFormatter::format_transcript(&record(TerminationReason::ForcedFinalRound));
        let round1 = text.find("Round 1").unwrap();
        let round2 = text.find("Round 2 (forced final round)").unwrap();
        let architect = text.find("Use Postgres.").unwrap();
        let decision = text.find("We go with Postgres.").unwrap();
        assert!(round1 < architect && architect < round2 && round2 < decision);
        assert_eq!(text.matches("Assessment:").count(), 1);
    }

    #[test]
    fn test_round_limit_outcome() {
        let text = ConsoleFormatter::format_summary(&record(TerminationReason::RoundLimit));
        assert!(text.contains("no consensus"));
    }

    #[test]
    fn test_json_is_the_record() {
        let rec = record(TerminationReason::Consensus);
        let json: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter.render(&rec, OutputFormat::Json)).unwrap();
        assert_eq!(json["current_round"], 2);
        assert_eq!(json["termination"], "consensus");
        assert_eq!(json["rounds"].as_array().unwrap().len(), 3);
    }
}
