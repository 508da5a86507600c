//! # baton
//!
//! Chat with your DAW: a function-calling front end wiring a hosted
//! language model to Ableton Live's OSC remote control.
//!
//! Two independent flows make up the crate:
//!
//! - **Conversation loop**: send a transcript plus a tool manifest to the
//!   completion API, dispatch any tool call the model selects to a local
//!   function, append the correlated result, and request a follow-up
//!   completion for the final natural-language reply.
//! - **Control-surface bridge**: one UDP socket speaking OSC to the DAW,
//!   composing fire-and-forget sends with one-shot reply listeners into
//!   read-tempo and write-tempo operations.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]

pub mod cli;
pub mod dispatch;
pub mod error;
pub mod llm;
pub mod osc;
pub mod tools;
pub mod transcript;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use transcript::{Message, Role, ToolCallRecord, Transcript};

// Re-export completion types
pub use llm::{CompletionBackend, CompletionOutcome, OpenAiBackend};

// Re-export tool types
pub use tools::{Tool, ToolRegistry};

// Re-export dispatcher
pub use dispatch::Dispatcher;

// Re-export bridge types
pub use osc::{BridgeConfig, OscBridge};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};
