//! Conversation dispatcher.
//!
//! Drives the function-calling loop: request a completion with the tool
//! manifest declared, execute whatever tool calls the model selects,
//! append the correlated results, and request a follow-up completion
//! until the model answers in natural language.

use tracing::debug;

use crate::error::{CompletionError, Result};
use crate::llm::CompletionBackend;
use crate::tools::ToolRegistry;
use crate::transcript::Transcript;

/// Runs the function-calling loop over one backend and tool registry.
pub struct Dispatcher<'a> {
    backend: &'a dyn CompletionBackend,
    registry: &'a ToolRegistry,
}

impl<'a> Dispatcher<'a> {
    /// Creates a dispatcher over `backend` and `registry`.
    #[must_use]
    pub const fn new(backend: &'a dyn CompletionBackend, registry: &'a ToolRegistry) -> Self {
        Self { backend, registry }
    }

    /// Runs the loop to completion and returns the final reply.
    ///
    /// A reply that names no tools is returned verbatim without invoking
    /// any local function. Otherwise every requested call is dispatched
    /// exactly once, in order, its result appended under the model's
    /// correlation identifier, and a follow-up completion requested.
    ///
    /// # Errors
    ///
    /// Propagates completion failures, unknown tool names, malformed
    /// argument payloads, and bridge faults; there is no recovery path.
    pub async fn run(&self, transcript: &mut Transcript) -> Result<String> {
        loop {
            let outcome = self
                .backend
                .complete(transcript.to_request_messages()?, self.registry.manifest())
                .await?;

            if !outcome.has_tool_calls() {
                let content =
                    outcome
                        .content
                        .ok_or_else(|| CompletionError::MalformedResponse {
                            reason: "reply carried neither content nor tool calls".to_string(),
                        })?;
                transcript.push_assistant(Some(content.clone()), Vec::new());
                return Ok(content);
            }

            debug!(calls = outcome.tool_calls.len(), "model requested tools");
            transcript.push_assistant(outcome.content, outcome.tool_calls.clone());
            for call in &outcome.tool_calls {
                let result = self.registry.dispatch(call).await?;
                transcript.push_tool_result(&call.id, result);
            }
        }
    }
}
