//! CLI layer for baton.
//!
//! Provides the command-line interface using clap, with commands for
//! chatting with the model and driving the tempo bridge directly.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands, TempoCommands};
