use serde::{Deserialize, Serialize};

use crate::error::ChatError;
use crate::message::Message;

/// Events emitted by a conversation session.
/// The host drains these to drive toasts, spinners and the error banner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// Initial message list established
    Reconciled { message_count: usize, reply_owed: bool },

    /// A model call went out
    InvocationStarted { seq: u64, message_count: usize },

    /// A message was appended to the conversation
    MessageAppended { message: Message },

    /// The model replied
    InvocationSucceeded { seq: u64 },

    /// The model call failed and a fallback reply was appended
    InvocationFailed { seq: u64, error: ChatError },

    /// History was cut back to the last user turn for another attempt
    Retried { message_count: usize },

    /// A result arrived for a call the session no longer owes
    StaleResponseDiscarded { seq: u64 },

    PersistenceFailed { message_id: String, error: ChatError },

    HistoryLoadFailed { error: String },

    TitleUpdated { title: String },
}
