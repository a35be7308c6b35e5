//! Progress notification port
//!
//! Defines the interface for reporting progress while a discussion runs.

use roundtable_domain::{DiscussionRecord, RoleSpec, RoundEvaluationResult, Topic};

/// Callback for progress updates during a discussion
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (spinner, plain lines, etc.)
pub trait DiscussionProgressNotifier: Send + Sync {
    /// Called when a round starts with the number of scheduled speakers
    fn on_round_start(&self, round: u32, speakers: usize);

    /// Called after each participant turn
    fn on_turn_complete(&self, round: u32, role: &RoleSpec, success: bool);

    /// Called after a round has been evaluated
    fn on_evaluation(&self, round: u32, result: &RoundEvaluationResult);

    /// Called when the discussion starts
    fn on_discussion_start(&self, _topic: &Topic, _max_rounds: u32) {}

    /// Called when rounds ran out and the forced final round begins
    fn on_forced_final_round(&self, _round: u32) {}

    /// Called once with the finished record
    fn on_discussion_complete(&self, _record: &DiscussionRecord) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl DiscussionProgressNotifier for NoProgress {
    fn on_round_start(&self, _round: u32, _speakers: usize) {}
    fn on_turn_complete(&self, _round: u32, _role: &RoleSpec, _success: bool) {}
    fn on_evaluation(&self, _round: u32, _result: &RoundEvaluationResult) {}
}
