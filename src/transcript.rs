//! Conversation transcript for the completion loop.
//!
//! A transcript is the ordered list of message records exchanged with the
//! model during one process invocation. Records are only ever appended, in
//! strict chronological order, and are never persisted or replayed.

use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionToolType, FunctionCall,
};
use serde::{Deserialize, Serialize};

use crate::error::CompletionError;

/// Role tag carried by every transcript record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions framing the whole conversation.
    System,
    /// End-user input.
    User,
    /// Model output (text, tool calls, or both).
    Assistant,
    /// Result of a local tool invocation.
    Tool,
}

/// A model-issued request to invoke a named local function.
///
/// The `arguments` field is the string-encoded JSON payload exactly as the
/// completion API emits it; parsing happens at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Correlation identifier assigned by the model.
    pub id: String,
    /// Name of the requested tool.
    pub name: String,
    /// String-encoded JSON arguments.
    pub arguments: String,
}

/// One record in the conversation transcript.
///
/// Tool-role records carry the correlation identifier linking them to the
/// assistant's original tool-call request; assistant records carry the
/// tool calls the model issued alongside (or instead of) text content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role tag for this record.
    pub role: Role,
    /// Free-text content, absent for pure tool-call assistant turns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Tool calls issued by an assistant record.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRecord>,
    /// Correlation identifier on tool-role records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    /// Creates a system record.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Creates a user record.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Creates an assistant record from model output.
    #[must_use]
    pub fn assistant(content: Option<String>, tool_calls: Vec<ToolCallRecord>) -> Self {
        Self {
            role: Role::Assistant,
            content,
            tool_calls,
            tool_call_id: None,
        }
    }

    /// Creates a tool-result record correlated to `tool_call_id`.
    #[must_use]
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

/// Append-only ordered sequence of conversation records.
///
/// # Examples
///
/// ```
/// use baton::transcript::Transcript;
///
/// let mut transcript = Transcript::new();
/// transcript.push_system("You control a DAW.");
/// transcript.push_user("What tempo is my song playing at?");
/// assert_eq!(transcript.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Creates an empty transcript.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Appends a record.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Appends a system record.
    pub fn push_system(&mut self, content: impl Into<String>) {
        self.push(Message::system(content));
    }

    /// Appends a user record.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Message::user(content));
    }

    /// Appends an assistant record.
    pub fn push_assistant(&mut self, content: Option<String>, tool_calls: Vec<ToolCallRecord>) {
        self.push(Message::assistant(content, tool_calls));
    }

    /// Appends a tool-result record correlated to `tool_call_id`.
    pub fn push_tool_result(
        &mut self,
        tool_call_id: impl Into<String>,
        content: impl Into<String>,
    ) {
        self.push(Message::tool_result(tool_call_id, content));
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Checks whether the transcript is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns the records in chronological order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Renders the transcript into completion-API request messages.
    ///
    /// # Errors
    ///
    /// Returns [`CompletionError::InvalidRequest`] if a record cannot be
    /// expressed as a request message (e.g. a tool record with no
    /// correlation identifier).
    pub fn to_request_messages(
        &self,
    ) -> Result<Vec<ChatCompletionRequestMessage>, CompletionError> {
        self.messages.iter().map(to_request_message).collect()
    }
}

/// Renders one transcript record as a completion-API request message.
fn to_request_message(
    message: &Message,
) -> Result<ChatCompletionRequestMessage, CompletionError> {
    let invalid = |e: async_openai::error::OpenAIError| CompletionError::InvalidRequest(e.to_string());

    match message.role {
        Role::System => Ok(ChatCompletionRequestSystemMessageArgs::default()
            .content(message.content.clone().unwrap_or_default())
            .build()
            .map_err(invalid)?
            .into()),
        Role::User => Ok(ChatCompletionRequestUserMessageArgs::default()
            .content(message.content.clone().unwrap_or_default())
            .build()
            .map_err(invalid)?
            .into()),
        Role::Assistant => {
            let mut args = ChatCompletionRequestAssistantMessageArgs::default();
            if let Some(ref content) = message.content {
                args.content(content.clone());
            }
            if !message.tool_calls.is_empty() {
                let calls: Vec<ChatCompletionMessageToolCall> = message
                    .tool_calls
                    .iter()
                    .map(|call| ChatCompletionMessageToolCall {
                        id: call.id.clone(),
                        r#type: ChatCompletionToolType::Function,
                        function: FunctionCall {
                            name: call.name.clone(),
                            arguments: call.arguments.clone(),
                        },
                    })
                    .collect();
                args.tool_calls(calls);
            }
            Ok(args.build().map_err(invalid)?.into())
        }
        Role::Tool => {
            let tool_call_id = message.tool_call_id.clone().ok_or_else(|| {
                CompletionError::InvalidRequest(
                    "tool record without a correlation identifier".to_string(),
                )
            })?;
            Ok(ChatCompletionRequestToolMessageArgs::default()
                .tool_call_id(tool_call_id)
                .content(message.content.clone().unwrap_or_default())
                .build()
                .map_err(invalid)?
                .into())
        }
    }
}
