//! CLI entrypoint for roundtable
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod logging;

use anyhow::{Context, Result, bail};
use clap::Parser;
use roundtable_application::{
    ConsensusEvaluator, ConversationLogger, DiscussionProgressNotifier, GatewayParticipant,
    LlmGateway, NoConversationLogger, RunDiscussionInput, RunDiscussionUseCase,
};
use roundtable_domain::{Model, OrderingTables, OutputFormat, RoleRoster};
use roundtable_infrastructure::{ConfigLoader, JsonlConversationLogger, OpenAiGateway};
use roundtable_presentation::{
    Cli, ConsoleFormatter, OutputFormatter, ProgressReporter, SimpleProgress,
};
use std::io::IsTerminal;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = logging::init(cli.verbose, cli.log_file.as_deref())?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    info!("Starting roundtable");

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())?
    };

    let issues = config.validate();
    for issue in issues.iter().filter(|i| !i.is_error()) {
        warn!("Config: {}", issue);
    }
    let errors: Vec<String> = issues
        .iter()
        .filter(|i| i.is_error())
        .map(|i| i.to_string())
        .collect();
    if !errors.is_empty() {
        bail!("Invalid configuration:\n  {}", errors.join("\n  "));
    }

    if cli.no_color || !config.output.color {
        colored::control::set_override(false);
    }

    let topic = match cli.topic.clone() {
        Some(t) => t,
        None => bail!("A topic is required, e.g. roundtable \"Monolith or services?\""),
    };

    let round_config = cli.apply_round_overrides(config.discussion.to_round_config());
    let participant_model = cli
        .participant_model
        .as_deref()
        .map(Model::new)
        .unwrap_or_else(|| config.provider.participant_model());
    let scorer_model = cli
        .scorer_model
        .as_deref()
        .map(Model::new)
        .unwrap_or_else(|| config.provider.scorer_model());
    let format: OutputFormat = cli
        .format
        .map(OutputFormat::from)
        .or(config.output.format)
        .unwrap_or_default();

    // === Dependency Injection ===
    let gateway = Arc::new(OpenAiGateway::from_config(&config.provider)?);

    let conversation_logger: Arc<dyn ConversationLogger> = match &cli.log_conversation {
        Some(path) => Arc::new(JsonlConversationLogger::open(path).with_context(|| {
            format!("opening conversation log {}", path.display())
        })?),
        None => Arc::new(NoConversationLogger),
    };

    let roster = RoleRoster::default();
    let tables = OrderingTables::default();
    let resolved = tables.resolve(&roster)?;

    let participant_gateway: Arc<dyn LlmGateway> = gateway.clone();
    let participants = GatewayParticipant::new(participant_gateway, participant_model.clone())
        .with_conversation_logger(Arc::clone(&conversation_logger));
    let evaluator = ConsensusEvaluator::new(gateway, scorer_model.clone(), resolved)
        .with_conversation_logger(Arc::clone(&conversation_logger));

    let use_case = RunDiscussionUseCase::new(Arc::new(participants), Arc::new(evaluator))
        .with_conversation_logger(conversation_logger);
    let input = RunDiscussionInput::new(topic)
        .with_config(round_config)
        .with_roster(roster, tables);

    info!(
        "Participants on {}, scorer on {}",
        participant_model, scorer_model
    );

    // Progress goes to stderr when it is a terminal; plain lines would mix
    // with JSON on stdout, so they are only used for the text formats.
    let progress: Option<Box<dyn DiscussionProgressNotifier>> = if cli.quiet {
        None
    } else if std::io::stderr().is_terminal() {
        Some(Box::new(ProgressReporter::new()))
    } else if format != OutputFormat::Json {
        Some(Box::new(SimpleProgress))
    } else {
        None
    };

    let record = match progress {
        Some(progress) => use_case.execute_with_progress(input, progress.as_ref()).await?,
        None => use_case.execute(input).await?,
    };

    println!("{}", ConsoleFormatter.render(&record, format));

    Ok(())
}
