//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats.

use serde::Serialize;

use crate::error::Error;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Formats the model's final reply.
#[must_use]
pub fn format_reply(reply: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = reply.to_string();
            if !output.ends_with('\n') {
                output.push('\n');
            }
            output
        }
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ReplyOutput<'a> {
                reply: &'a str,
            }
            format_json(&ReplyOutput { reply })
        }
    }
}

/// Formats a tempo value.
#[must_use]
pub fn format_tempo(tempo: f32, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("{tempo} BPM\n"),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct TempoOutput {
                tempo: f32,
            }
            format_json(&TempoOutput { tempo })
        }
    }
}

/// Formats an error for the selected output format.
#[must_use]
pub fn format_error(err: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => err.to_string(),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ErrorOutput {
                error: String,
            }
            format_json(&ErrorOutput {
                error: err.to_string(),
            })
        }
    }
}

/// Formats a value as JSON.
fn format_json<T: Serialize>(value: &T) -> String {
    let mut output = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
    output.push('\n');
    output
}
