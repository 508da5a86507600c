//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use std::sync::Arc;

use crate::cli::output::{OutputFormat, format_reply, format_tempo};
use crate::cli::parser::{Cli, Commands, TempoCommands};
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::llm::OpenAiBackend;
use crate::osc::OscBridge;
use crate::tools::{ToolRegistry, register_tempo_tools};
use crate::transcript::Transcript;

/// System prompt framing the conversation.
const SYSTEM_PROMPT: &str =
    "You are a helpful assistant controlling a music production session in Ableton Live. \
     Use the available tools to read or change the session when the user asks about it.";

/// Prompt used when `ask` is given no argument.
const DEFAULT_PROMPT: &str = "What tempo is my song playing at?";

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub async fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Ask { prompt } => cmd_ask(cli, prompt.as_deref(), format).await,
        Commands::Tempo(TempoCommands::Get) => cmd_tempo_get(cli, format).await,
        Commands::Tempo(TempoCommands::Set { bpm }) => cmd_tempo_set(cli, *bpm, format).await,
    }
}

/// Connects the bridge with the endpoints from the CLI.
async fn connect_bridge(cli: &Cli) -> Result<OscBridge> {
    Ok(OscBridge::connect(&cli.bridge_config()).await?)
}

// ==================== Command Implementations ====================

async fn cmd_ask(cli: &Cli, prompt: Option<&str>, format: OutputFormat) -> Result<String> {
    // The credential check happens before any socket is opened.
    let backend = OpenAiBackend::from_env(&cli.model)?;

    let bridge = Arc::new(connect_bridge(cli).await?);
    let mut registry = ToolRegistry::new();
    register_tempo_tools(&mut registry, &bridge);

    let mut transcript = Transcript::new();
    transcript.push_system(SYSTEM_PROMPT);
    transcript.push_user(prompt.unwrap_or(DEFAULT_PROMPT));

    let reply = Dispatcher::new(&backend, &registry)
        .run(&mut transcript)
        .await?;
    Ok(format_reply(&reply, format))
}

async fn cmd_tempo_get(cli: &Cli, format: OutputFormat) -> Result<String> {
    let bridge = connect_bridge(cli).await?;
    let tempo = bridge.get_tempo().await?;
    Ok(format_tempo(tempo, format))
}

async fn cmd_tempo_set(cli: &Cli, bpm: f32, format: OutputFormat) -> Result<String> {
    let bridge = connect_bridge(cli).await?;
    let tempo = bridge.set_tempo(bpm).await?;
    Ok(format_tempo(tempo, format))
}
