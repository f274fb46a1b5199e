//! Error types for the conversational core.

use hoover_core::HooverError;

use crate::state::TurnPhase;
use crate::transport::TransportError;

/// Errors from the chat engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("vocabulary error: {0}")]
    Vocabulary(String),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("invalid turn transition: {from:?} -> {to:?}")]
    InvalidTransition { from: TurnPhase, to: TurnPhase },
}

impl From<ChatError> for HooverError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Vocabulary(msg) => HooverError::Vocabulary(msg),
            other => HooverError::Api(other.to_string()),
        }
    }
}
