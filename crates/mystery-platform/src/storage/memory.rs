//! In-memory message repository.
//! Used for anonymous sessions and tests; nothing survives a page reload.

use std::cell::RefCell;
use std::collections::HashMap;
use async_trait::async_trait;
use mystery_core::ports::MessageRepository;
use mystery_types::{Result, message::Message, stored::StoredMessage};

#[derive(Default)]
pub struct MemoryRepository {
    messages: RefCell<HashMap<String, Vec<StoredMessage>>>,
    titles: RefCell<HashMap<String, String>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a conversation with rows, as if they had been stored earlier
    pub fn with_history(conversation_id: &str, rows: Vec<StoredMessage>) -> Self {
        let repo = Self::new();
        repo.messages
            .borrow_mut()
            .insert(conversation_id.to_string(), rows);
        repo
    }

    pub fn title(&self, conversation_id: &str) -> Option<String> {
        self.titles.borrow().get(conversation_id).cloned()
    }
}

#[async_trait(?Send)]
impl MessageRepository for MemoryRepository {
    async fn append(&self, conversation_id: &str, message: &Message) -> Result<()> {
        self.messages
            .borrow_mut()
            .entry(conversation_id.to_string())
            .or_default()
            .push(StoredMessage::from_message(message));
        Ok(())
    }

    async fn list_by_conversation(&self, conversation_id: &str) -> Result<Vec<StoredMessage>> {
        Ok(self
            .messages
            .borrow()
            .get(conversation_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_title(&self, conversation_id: &str, title: &str) -> Result<()> {
        self.titles
            .borrow_mut()
            .insert(conversation_id.to_string(), title.to_string());
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
