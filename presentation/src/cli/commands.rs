//! CLI command definitions

use clap::{Parser, ValueEnum};
use roundtable_domain::{DynamicRoundConfig, OutputFormat};
use std::path::PathBuf;

/// Output format for a finished discussion
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Topic, rounds, final metrics and consensus status
    Summary,
    /// Every turn grouped by round, with per-round metrics
    Transcript,
    /// The discussion record as JSON
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Summary => OutputFormat::Summary,
            FormatArg::Transcript => OutputFormat::Transcript,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// CLI arguments for roundtable
#[derive(Parser, Debug)]
#[command(name = "roundtable")]
#[command(author, version, about = "Expert roundtable - simulated specialists discuss until they agree")]
#[command(long_about = r#"
Roundtable runs a moderated discussion between simulated experts
(Architect, Senior Developer, Security Engineer, Performance Engineer,
Decision Maker and an optional Moderator) on a technical topic.

After every round a scorer measures agreement. The discussion stops early
once consensus is reached, and otherwise closes with a forced final round
in which the Decision Maker speaks first.

Configuration files are loaded from (in priority order):
1. ROUNDTABLE_* env vars   e.g. ROUNDTABLE_DISCUSSION__MAX_ROUNDS=8
2. --config <path>         Explicit config file
3. ./roundtable.toml       Project-level config
4. ~/.config/roundtable/config.toml   Global config

Example:
  roundtable "Should we move session storage from Redis to Postgres?"
  roundtable --max-rounds 4 --format transcript "Monolith or services for billing?"
"#)]
pub struct Cli {
    /// The topic to discuss
    pub topic: Option<String>,

    /// Output format (overrides [output].format)
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Earliest round after which the discussion may stop
    #[arg(long, value_name = "N")]
    pub min_rounds: Option<u32>,

    /// Rounds before the forced final round
    #[arg(long, value_name = "N")]
    pub max_rounds: Option<u32>,

    /// Agreement score (0-100) required for consensus
    #[arg(long, value_name = "SCORE")]
    pub threshold: Option<u32>,

    /// Unresolved issues tolerated at consensus
    #[arg(long, value_name = "N")]
    pub tolerance: Option<u32>,

    /// Never bring in the moderator
    #[arg(long)]
    pub no_moderator: bool,

    /// Run exactly --max-rounds rounds without early termination
    #[arg(long)]
    pub static_rounds: bool,

    /// Model that plays the participants (overrides [provider].participant_model)
    #[arg(long, value_name = "MODEL")]
    pub participant_model: Option<String>,

    /// Model that scores consensus (overrides [provider].scorer_model)
    #[arg(long, value_name = "MODEL")]
    pub scorer_model: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Append every discussion event to this JSONL file
    #[arg(long, value_name = "PATH")]
    pub log_conversation: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Apply the round-control flags on top of the file configuration
    pub fn apply_round_overrides(&self, mut config: DynamicRoundConfig) -> DynamicRoundConfig {
        if let Some(min) = self.min_rounds {
            config.min_rounds = min;
        }
        if let Some(max) = self.max_rounds {
            config.max_rounds = max;
        }
        if let Some(threshold) = self.threshold {
            config = config.with_threshold(threshold);
        }
        if let Some(tolerance) = self.tolerance {
            config = config.with_tolerance(tolerance);
        }
        if self.no_moderator {
            config = config.without_moderator();
        }
        if self.static_rounds {
            config = config.static_rounds();
        }
        config
    }
}
