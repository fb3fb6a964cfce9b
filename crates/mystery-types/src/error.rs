use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from adapters and configuration
#[derive(Error, Debug, Clone)]
pub enum MysteryError {
    #[error("Model service error: {0}")]
    Model(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for MysteryError {
    fn from(e: serde_json::Error) -> Self {
        MysteryError::Serialization(e.to_string())
    }
}

/// Errors a conversation session reports to its host.
///
/// None of these are fatal: the conversation always continues.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail")]
pub enum ChatError {
    /// Empty body or a body carrying the error sentinel
    #[error("The AI service returned an unusable response: {0}")]
    MalformedResponse(String),

    /// The invocation itself failed
    #[error("Error connecting to AI service: {0}")]
    TransportFailure(String),

    #[error("Cannot send an empty message")]
    EmptySubmission,

    #[error("A response is already being generated")]
    InvocationPending,

    /// The host has unmounted this conversation
    #[error("This conversation is no longer open")]
    SessionClosed,

    #[error("Failed to save message: {0}")]
    PersistenceFailure(String),
}

impl ChatError {
    /// Whether the host should show a dismissible banner with a retry action
    pub fn shows_banner(&self) -> bool {
        matches!(
            self,
            ChatError::MalformedResponse(_) | ChatError::TransportFailure(_)
        )
    }
}

impl From<ChatError> for MysteryError {
    fn from(e: ChatError) -> Self {
        MysteryError::Other(e.to_string())
    }
}
