//! One-shot history load at session start.

use mystery_types::{event::SessionEvent, stored::StoredMessage};

use crate::event_bus::EventBus;
use crate::ports::MessageRepository;

/// Read a conversation's stored messages once.
///
/// A failed read is logged and reported on the bus, and yields empty history
/// so the session can still mount.
pub async fn load_history(
    repo: &dyn MessageRepository,
    conversation_id: &str,
    event_bus: &EventBus,
) -> Vec<StoredMessage> {
    match repo.list_by_conversation(conversation_id).await {
        Ok(rows) => {
            log::info!(
                "Loaded {} messages for conversation {} from {}",
                rows.len(),
                conversation_id,
                repo.backend_name()
            );
            rows
        }
        Err(e) => {
            log::error!("Failed to load conversation {}: {}", conversation_id, e);
            event_bus.emit(SessionEvent::HistoryLoadFailed { error: e.to_string() });
            Vec::new()
        }
    }
}
