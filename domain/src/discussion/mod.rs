//! Discussion domain
//!
//! The data a roundtable discussion is made of: who may speak ([`role`]),
//! what was said ([`turn`]), the thresholds that govern when talking may stop
//! ([`config`]) and the finished record handed to formatters ([`record`]).

pub mod config;
pub mod record;
pub mod role;
pub mod turn;

pub use config::DynamicRoundConfig;
pub use record::{DiscussionRecord, TerminationReason};
pub use role::{RoleId, RoleRoster, RoleSpec};
pub use turn::{Transcript, Turn};
