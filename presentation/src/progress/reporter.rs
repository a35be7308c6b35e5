//! Progress reporting while a discussion runs

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use roundtable_application::DiscussionProgressNotifier;
use roundtable_domain::{DiscussionRecord, RoleSpec, RoundEvaluationResult, Topic};
use std::sync::Mutex;

/// Reports progress with one indicatif bar per round
pub struct ProgressReporter {
    multi: MultiProgress,
    round_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            round_bar: Mutex::new(None),
        }
    }

    fn round_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{spinner:.green} {prefix:.bold.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-")
    }

    fn evaluation_line(round: u32, result: &RoundEvaluationResult) -> String {
        let m = &result.metrics;
        format!(
            "Round {}: agreement {} confidence {} phase {} ({} open issues, {})",
            round,
            m.agreement_score,
            m.confidence_level,
            m.discussion_phase,
            m.unresolved_issues.len(),
            result.source.as_str()
        )
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscussionProgressNotifier for ProgressReporter {
    fn on_discussion_start(&self, topic: &Topic, max_rounds: u32) {
        let _ = self.multi.println(format!(
            "{} {} (up to {} rounds)",
            "->".cyan(),
            topic.content().bold(),
            max_rounds
        ));
    }

    fn on_round_start(&self, round: u32, speakers: usize) {
        let pb = self.multi.add(ProgressBar::new(speakers as u64));
        pb.set_style(Self::round_style());
        pb.set_prefix(format!("Round {}", round));
        pb.set_message("Starting...");

        if let Ok(mut slot) = self.round_bar.lock() {
            *slot = Some(pb);
        }
    }

    fn on_turn_complete(&self, _round: u32, role: &RoleSpec, success: bool) {
        if let Ok(slot) = self.round_bar.lock()
            && let Some(pb) = slot.as_ref()
        {
            let status = if success {
                format!("{} {}", "v".green(), role.display_name)
            } else {
                format!("{} {}", "x".red(), role.display_name)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_evaluation(&self, round: u32, result: &RoundEvaluationResult) {
        let line = Self::evaluation_line(round, result);
        if let Ok(mut slot) = self.round_bar.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_with_message(line);
        } else {
            let _ = self.multi.println(line);
        }
    }

    fn on_forced_final_round(&self, round: u32) {
        if let Ok(mut slot) = self.round_bar.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_with_message("done".green().to_string());
        }
        let _ = self.multi.println(format!(
            "{} No consensus yet, round {} decides",
            "!".yellow().bold(),
            round
        ));
    }

    fn on_discussion_complete(&self, record: &DiscussionRecord) {
        if let Ok(mut slot) = self.round_bar.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_with_message(format!("{}", "complete!".green()));
        }
        let _ = self.multi.println(format!(
            "{} Finished after {} rounds ({})",
            "v".green(),
            record.current_round,
            record.termination
        ));
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl DiscussionProgressNotifier for SimpleProgress {
    fn on_discussion_start(&self, topic: &Topic, max_rounds: u32) {
        println!(
            "{} {} (up to {} rounds)",
            "->".cyan(),
            topic.content().bold(),
            max_rounds
        );
    }

    fn on_round_start(&self, round: u32, speakers: usize) {
        println!(
            "{} {} ({} speakers)",
            "->".cyan(),
            format!("Round {}", round).bold(),
            speakers
        );
    }

    fn on_turn_complete(&self, _round: u32, role: &RoleSpec, success: bool) {
        if success {
            println!("  {} {}", "v".green(), role.display_name);
        } else {
            println!("  {} {} (failed)", "x".red(), role.display_name);
        }
    }

    fn on_evaluation(&self, round: u32, result: &RoundEvaluationResult) {
        println!("  {}", ProgressReporter::evaluation_line(round, result));
    }

    fn on_forced_final_round(&self, round: u32) {
        println!(
            "{} No consensus yet, round {} decides",
            "!".yellow().bold(),
            round
        );
    }

    fn on_discussion_complete(&self, _record: &DiscussionRecord) {
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_domain::{ConsensusMetrics, EvaluationSource};

    #[test]
    fn test_evaluation_line() {
        let result = RoundEvaluationResult {
            metrics: ConsensusMetrics::evaluation_fallback(),
            should_terminate: false,
            next_round_focus: vec![],
            recommended_order: vec![0, 1, 2],
            source: EvaluationSource::StaticFallback,
        };
        let line = ProgressReporter::evaluation_line(3, &result);
        assert!(line.starts_with("Round 3: agreement 60"));
        assert!(line.contains("1 open issues"));
        assert!(line.contains(EvaluationSource::StaticFallback.as_str()));
    }

    #[test]
    fn test_reporter_tolerates_events_without_round_bar() {
        let reporter = ProgressReporter::new();
        let role = RoleSpec::new("qa", "QA", "testing");
        reporter.on_turn_complete(1, &role, true);
        reporter.on_forced_final_round(2);
        reporter.on_round_start(2, 3);
        reporter.on_turn_complete(2, &role, false);
    }
}
