//! Port traits — the hexagonal architecture boundary.
//!
//! The session controller only talks to the model service and the message
//! store through these traits. Browser implementations live in
//! `mystery-platform`.

use async_trait::async_trait;
use mystery_types::{
    Result,
    config::PromptTier,
    message::{ChatTurn, Message},
    stored::StoredMessage,
};

// ─── Model Invocation Port ───────────────────────────────────

/// One model call: the full ordered history plus the prompt tier.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub messages: Vec<ChatTurn>,
    pub tier: PromptTier,
    /// Preference reminder derived from the form, if one was supplied
    pub system_instruction: Option<String>,
}

#[async_trait(?Send)]
pub trait ModelPort {
    /// Map the request to a single response body. Timeouts are the
    /// implementation's responsibility.
    async fn invoke(&self, req: ModelRequest) -> Result<String>;

    /// Name of this service (for logging/debug)
    fn service_name(&self) -> &str;
}

// ─── Message Repository Port ─────────────────────────────────

#[async_trait(?Send)]
pub trait MessageRepository {
    /// Append one message to a conversation
    async fn append(&self, conversation_id: &str, message: &Message) -> Result<()>;

    /// Every stored message of a conversation, oldest first where the
    /// backend can order them
    async fn list_by_conversation(&self, conversation_id: &str) -> Result<Vec<StoredMessage>>;

    /// Rename the conversation
    async fn update_title(&self, conversation_id: &str, title: &str) -> Result<()>;

    /// Name of this backend (for logging/debug)
    fn backend_name(&self) -> &str;
}

// ─── Persistence Hook ────────────────────────────────────────

/// Receives every message a session finalizes, exactly once, in append order.
///
/// Fire-and-forget: implementations must return immediately and handle their
/// own failures. The session never waits on, or rolls back for, a save.
pub trait PersistHook {
    fn persist(&self, message: &Message);
}

/// Hook for sessions that have nowhere to save to (anonymous or unsaved
/// conversations).
pub struct NoPersistence;

impl PersistHook for NoPersistence {
    fn persist(&self, message: &Message) {
        log::debug!("Not persisting message {}: no conversation to save to", message.id);
    }
}
