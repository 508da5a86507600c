//! Completion API client.
//!
//! Wraps `async-openai` behind the [`CompletionBackend`] trait so the
//! conversation dispatcher can be exercised without a network. One
//! implementation exists: [`OpenAiBackend`], configured from a model name
//! and the `OPENAI_API_KEY` credential.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestMessage, ChatCompletionTool,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::debug;

use crate::error::CompletionError;
use crate::transcript::ToolCallRecord;

/// Environment variable carrying the API credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default model used for completion requests.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Outcome of one completion request.
///
/// Carries the assistant's text (if any) and the tool calls it issued
/// (if any), mapped from the first response choice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionOutcome {
    /// Natural-language content of the assistant reply.
    pub content: Option<String>,
    /// Tool invocations requested by the assistant.
    pub tool_calls: Vec<ToolCallRecord>,
}

impl CompletionOutcome {
    /// Checks whether the reply requested any tool invocations.
    #[must_use]
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// One request/response exchange with a hosted language model.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Requests a completion for `messages` with `tools` declared.
    async fn complete(
        &self,
        messages: Vec<ChatCompletionRequestMessage>,
        tools: Vec<ChatCompletionTool>,
    ) -> Result<CompletionOutcome, CompletionError>;
}

/// Completion backend over the OpenAI chat API.
///
/// The API key is stored inside the `async_openai::Client`, whose config
/// keeps it in a redacting secret type, so `Debug` does not expose it.
#[derive(Debug)]
pub struct OpenAiBackend {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiBackend {
    /// Creates a backend for `model` with an explicit credential.
    ///
    /// # Errors
    ///
    /// Returns [`CompletionError::MissingCredential`] if `api_key` is
    /// empty: a request with no credential must fail here rather than
    /// silently reach the API.
    pub fn new(model: impl Into<String>, api_key: &str) -> Result<Self, CompletionError> {
        if api_key.is_empty() {
            return Err(CompletionError::MissingCredential {
                variable: API_KEY_ENV.to_string(),
            });
        }
        let config = OpenAIConfig::new().with_api_key(api_key);
        Ok(Self {
            client: Client::with_config(config),
            model: model.into(),
        })
    }

    /// Creates a backend for `model` from the `OPENAI_API_KEY` variable.
    ///
    /// # Errors
    ///
    /// Returns [`CompletionError::MissingCredential`] if the variable is
    /// unset or empty.
    pub fn from_env(model: impl Into<String>) -> Result<Self, CompletionError> {
        let api_key =
            std::env::var(API_KEY_ENV).map_err(|_| CompletionError::MissingCredential {
                variable: API_KEY_ENV.to_string(),
            })?;
        Self::new(model, &api_key)
    }

    /// Returns the model requests are issued against.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(
        &self,
        messages: Vec<ChatCompletionRequestMessage>,
        tools: Vec<ChatCompletionTool>,
    ) -> Result<CompletionOutcome, CompletionError> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model).messages(messages);
        // The API rejects an empty tools array, so only declare a non-empty manifest.
        if !tools.is_empty() {
            args.tools(tools);
        }
        let request = args
            .build()
            .map_err(|e| CompletionError::InvalidRequest(e.to_string()))?;

        debug!(model = %self.model, "requesting completion");
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(map_openai_error)?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::MalformedResponse {
                reason: "response carried no choices".to_string(),
            })?;

        let outcome = outcome_from_parts(choice.message.content, choice.message.tool_calls);
        debug!(
            tool_calls = outcome.tool_calls.len(),
            has_content = outcome.content.is_some(),
            "completion received"
        );
        Ok(outcome)
    }
}

/// Maps the first choice's message parts into a [`CompletionOutcome`].
fn outcome_from_parts(
    content: Option<String>,
    tool_calls: Option<Vec<ChatCompletionMessageToolCall>>,
) -> CompletionOutcome {
    let tool_calls = tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| ToolCallRecord {
            id: call.id,
            name: call.function.name,
            arguments: call.function.arguments,
        })
        .collect();
    CompletionOutcome {
        content,
        tool_calls,
    }
}

/// Maps an `async_openai` error into the crate's completion taxonomy.
fn map_openai_error(err: async_openai::error::OpenAIError) -> CompletionError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let error_type = api_err.r#type.as_deref().unwrap_or("");
            if error_type == "authentication_error"
                || api_err.message.contains("Incorrect API key")
                || api_err.message.contains("Invalid API key")
            {
                CompletionError::AuthenticationFailed
            } else if error_type == "rate_limit_error"
                || api_err.message.contains("Rate limit")
            {
                CompletionError::RateLimited
            } else {
                CompletionError::Api(api_err.message.clone())
            }
        }
        OpenAIError::Reqwest(reqwest_err) => {
            if let Some(status) = reqwest_err.status() {
                match status.as_u16() {
                    401 => CompletionError::AuthenticationFailed,
                    429 => CompletionError::RateLimited,
                    _ => CompletionError::Transport(err.to_string()),
                }
            } else {
                CompletionError::Transport(err.to_string())
            }
        }
        OpenAIError::InvalidArgument(msg) => CompletionError::InvalidRequest(msg.clone()),
        OpenAIError::JSONDeserialize(_) => CompletionError::MalformedResponse {
            reason: err.to_string(),
        },
        _ => CompletionError::Api(err.to_string()),
    }
}
