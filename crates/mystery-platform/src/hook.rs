//! Persistence hook backed by a [`MessageRepository`].
//!
//! `persist` spawns the save and returns at once; the session never sees
//! the outcome. Failures are logged and surface on the event bus only.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use mystery_core::event_bus::EventBus;
use mystery_core::ports::{MessageRepository, PersistHook};
use mystery_core::title::extract_title;
use mystery_types::{ChatError, event::SessionEvent, message::Message, stored::StoredMessage};

#[derive(Clone)]
pub struct RepositoryHook {
    repo: Rc<dyn MessageRepository>,
    conversation_id: Rc<str>,
    event_bus: EventBus,
    last_title: Rc<RefCell<Option<String>>>,
}

impl RepositoryHook {
    pub fn new(repo: Rc<dyn MessageRepository>, conversation_id: &str, event_bus: EventBus) -> Self {
        Self {
            repo,
            conversation_id: Rc::from(conversation_id),
            event_bus,
            last_title: Rc::new(RefCell::new(None)),
        }
    }

    /// Record the title already named by stored history so later replies
    /// cannot replace it.
    pub fn adopt_title(&self, history: &[StoredMessage]) {
        let now = Utc::now();
        let messages: Vec<Message> = history.iter().cloned().map(|row| row.into_message(now)).collect();
        if let Some(title) = extract_title(&messages) {
            log::debug!("Conversation {} already titled \"{}\"", self.conversation_id, title);
            *self.last_title.borrow_mut() = Some(title);
        }
    }

    /// Save one message, then title the conversation if it has no title yet
    /// and the message is an assistant reply that names one.
    pub async fn persist_now(&self, message: &Message) {
        if let Err(e) = self.repo.append(&self.conversation_id, message).await {
            log::error!("Failed to save message {}: {}", message.id, e);
            self.event_bus.emit(SessionEvent::PersistenceFailed {
                message_id: message.id.clone(),
                error: ChatError::PersistenceFailure(e.to_string()),
            });
            return;
        }
        log::debug!(
            "Saved message {} to {} ({})",
            message.id,
            self.conversation_id,
            self.repo.backend_name()
        );

        if message.is_ai() && self.last_title.borrow().is_none() {
            self.refresh_title(message).await;
        }
    }

    async fn refresh_title(&self, message: &Message) {
        let Some(title) = extract_title(std::slice::from_ref(message)) else {
            return;
        };
        match self.repo.update_title(&self.conversation_id, &title).await {
            Ok(()) => {
                log::info!("Conversation {} titled \"{}\"", self.conversation_id, title);
                *self.last_title.borrow_mut() = Some(title.clone());
                self.event_bus.emit(SessionEvent::TitleUpdated { title });
            }
            Err(e) => log::warn!("Failed to update title of {}: {}", self.conversation_id, e),
        }
    }
}

impl PersistHook for RepositoryHook {
    fn persist(&self, message: &Message) {
        let hook = self.clone();
        let message = message.clone();
        wasm_bindgen_futures::spawn_local(async move {
            hook.persist_now(&message).await;
        });
    }
}
