//! Error types for baton operations.
//!
//! This module provides the error hierarchy using `thiserror` for all
//! baton operations including completion requests, tool dispatch, and the
//! OSC control-surface bridge.

use thiserror::Error;

/// Result type alias for baton operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for baton operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Completion API errors (chat requests).
    #[error("completion error: {0}")]
    Completion(#[from] CompletionError),

    /// Tool dispatch errors (name lookup, argument parsing).
    #[error("tool error: {0}")]
    Tool(#[from] ToolError),

    /// Control-surface bridge errors (OSC over UDP).
    #[error("bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

/// Completion-API-specific errors.
#[derive(Error, Debug)]
pub enum CompletionError {
    /// API credential absent or empty.
    #[error("missing API credential: set {variable}")]
    MissingCredential {
        /// Environment variable that must carry the credential.
        variable: String,
    },

    /// The API rejected the credential.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The API rate-limited the request.
    #[error("rate limited by completion API")]
    RateLimited,

    /// The API returned an error payload.
    #[error("completion API error: {0}")]
    Api(String),

    /// Transport-level failure reaching the API.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request was rejected before being sent.
    #[error("invalid completion request: {0}")]
    InvalidRequest(String),

    /// The response carried no usable choice.
    #[error("malformed completion response: {reason}")]
    MalformedResponse {
        /// What was missing or unparseable.
        reason: String,
    },
}

/// Tool-dispatch-specific errors.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The model requested a tool with no local mapping.
    #[error("unknown tool: {name}")]
    UnknownTool {
        /// Name the model requested.
        name: String,
    },

    /// The tool-call argument payload failed to parse.
    #[error("invalid arguments for tool {name}: {reason}")]
    InvalidArguments {
        /// Tool whose arguments were malformed.
        name: String,
        /// Parse failure description.
        reason: String,
    },

    /// The tool result could not be serialized for the transcript.
    #[error("unserializable result from tool {name}: {reason}")]
    UnserializableResult {
        /// Tool whose result failed to serialize.
        name: String,
        /// Serialization failure description.
        reason: String,
    },
}

/// Control-surface-bridge-specific errors.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Failed to bind the local reply socket.
    #[error("failed to bind reply socket {addr}: {reason}")]
    Bind {
        /// Local address that could not be bound.
        addr: String,
        /// Bind failure description.
        reason: String,
    },

    /// Failed to write a packet to the peer.
    #[error("failed to send to {addr}: {reason}")]
    Send {
        /// OSC address of the outbound message.
        addr: String,
        /// Send failure description.
        reason: String,
    },

    /// Failed to read an inbound packet.
    #[error("failed to receive: {0}")]
    Receive(String),

    /// OSC encoding error.
    #[error("OSC encode error: {0}")]
    Encode(String),

    /// OSC decoding error.
    #[error("OSC decode error: {0}")]
    Decode(String),

    /// The peer's reply did not carry the expected payload.
    #[error("malformed reply on {addr}: {reason}")]
    MalformedReply {
        /// OSC address the reply arrived on.
        addr: String,
        /// What was wrong with the payload.
        reason: String,
    },
}

// Implement From traits for foreign errors

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        Self::Receive(err.to_string())
    }
}

impl From<rosc::OscError> for BridgeError {
    fn from(err: rosc::OscError) -> Self {
        Self::Decode(err.to_string())
    }
}
