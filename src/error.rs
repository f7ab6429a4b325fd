//! Client error types
//!
//! Every failure the client can run into. None of them is fatal to a page:
//! callers at the page level log the error and carry on.

use thiserror::Error;

/// Errors produced by the chat client
#[derive(Error, Debug)]
pub enum ChatError {
    /// Request could not be sent or the connection failed
    #[error("Network error: {0}")]
    Network(String),

    /// Server answered with a non-success status
    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Server response did not carry a room/conversation id
    #[error("Identifier not found in server response")]
    MissingIdentifier,

    /// Payload could not be decoded
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Send attempted with empty input
    #[error("Message is empty")]
    EmptyMessage,

    /// Send attempted while no socket is open
    #[error("WebSocket not connected")]
    NotConnected,

    /// Socket could not be created or written to
    #[error("Socket error: {0}")]
    Socket(String),

    /// Client-side storage failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Output of a renderer could not be written
    #[error("Render error: {0}")]
    Render(String),

    /// Message addressed to a container that was never opened
    #[error("No container for {0}")]
    UnknownContainer(String),
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::InvalidPayload(err.to_string())
    }
}

#[cfg(feature = "native")]
impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        ChatError::Network(err.to_string())
    }
}

/// Result type for client operations
pub type ChatResult<T> = Result<T, ChatError>;
