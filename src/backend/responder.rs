//! Reply generation.
//!
//! The backend does not run models itself; a [`Responder`] produces the
//! assistant turn from the conversation history.

use async_trait::async_trait;
use thiserror::Error;

use super::state::StoredMessage;
use crate::protocol::Role;

/// Text sent back when the responder fails
pub const FALLBACK_RESPONSE: &str = "Sorry, I couldn't generate a response at the moment.";

#[derive(Error, Debug)]
pub enum ResponderError {
    #[error("model {0} returned no output")]
    EmptyOutput(String),

    #[error("model request failed: {0}")]
    Request(String),
}

/// Produces the next assistant message of a conversation
#[async_trait]
pub trait Responder: Send + Sync {
    /// `history` ends with the user turn being answered
    async fn respond(&self, model: &str, history: &[StoredMessage]) -> Result<String, ResponderError>;
}

/// Answers with the last user message
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoResponder;

#[async_trait]
impl Responder for EchoResponder {
    async fn respond(&self, model: &str, history: &[StoredMessage]) -> Result<String, ResponderError> {
        history
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .ok_or_else(|| ResponderError::EmptyOutput(model.to_string()))
    }
}
