//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};

use crate::osc::BridgeConfig;

/// baton: chat with your DAW over OSC.
///
/// Sends a prompt and a tool manifest to a hosted language model, lets the
/// model read and set the song tempo through AbletonOSC, and prints the
/// final reply.
#[derive(Parser, Debug)]
#[command(name = "baton")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Model used for completion requests.
    #[arg(short, long, env = "BATON_MODEL", default_value = crate::llm::DEFAULT_MODEL, global = true)]
    pub model: String,

    /// Host the DAW's OSC server runs on.
    #[arg(long, env = "BATON_OSC_HOST", default_value = crate::osc::DEFAULT_HOST, global = true)]
    pub osc_host: String,

    /// Port the DAW listens on for OSC commands.
    #[arg(long, env = "BATON_OSC_SEND_PORT", default_value_t = crate::osc::DEFAULT_SEND_PORT, global = true)]
    pub send_port: u16,

    /// Local port OSC replies are delivered to.
    #[arg(long, env = "BATON_OSC_RECV_PORT", default_value_t = crate::osc::DEFAULT_RECV_PORT, global = true)]
    pub recv_port: u16,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask the model about the session; it may call the tempo tools.
    Ask {
        /// Prompt to send (defaults to asking for the current tempo).
        prompt: Option<String>,
    },

    /// Read or write the song tempo directly over the bridge.
    #[command(subcommand)]
    Tempo(TempoCommands),
}

/// Direct tempo operations.
#[derive(Subcommand, Debug)]
pub enum TempoCommands {
    /// Print the current tempo.
    Get,

    /// Set the tempo and print the value the DAW reports back.
    Set {
        /// Target tempo in beats per minute.
        bpm: f32,
    },
}

impl Cli {
    /// Returns the bridge endpoints selected by flags or environment.
    #[must_use]
    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            host: self.osc_host.clone(),
            send_port: self.send_port,
            recv_port: self.recv_port,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_parse() {
        // Test that CLI can be created
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_bridge_config() {
        let cli = Cli::parse_from(["baton", "tempo", "get"]);
        assert_eq!(cli.bridge_config(), BridgeConfig::default());
    }

    #[test]
    fn test_custom_bridge_endpoints() {
        let cli = Cli::parse_from([
            "baton",
            "--osc-host",
            "192.168.1.20",
            "--send-port",
            "9000",
            "--recv-port",
            "9001",
            "tempo",
            "get",
        ]);
        let config = cli.bridge_config();
        assert_eq!(config.host, "192.168.1.20");
        assert_eq!(config.send_port, 9000);
        assert_eq!(config.recv_port, 9001);
    }

    #[test]
    fn test_tempo_set_parses_bpm() {
        let cli = Cli::parse_from(["baton", "tempo", "set", "128.5"]);
        match cli.command {
            Commands::Tempo(TempoCommands::Set { bpm }) => {
                assert!((bpm - 128.5).abs() < f32::EPSILON);
            }
            other => panic!("expected tempo set, got {other:?}"),
        }
    }

    #[test]
    fn test_ask_prompt_optional() {
        let cli = Cli::parse_from(["baton", "ask"]);
        match cli.command {
            Commands::Ask { prompt } => assert!(prompt.is_none()),
            other => panic!("expected ask, got {other:?}"),
        }
    }
}
