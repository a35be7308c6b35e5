//! Use cases (application services)

pub mod degrade;
pub mod evaluate_round;
pub mod participant_turns;
pub mod round_strategy;
pub mod run_discussion;
