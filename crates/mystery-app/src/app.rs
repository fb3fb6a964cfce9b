//! Chat handle: owns one conversation session and the adapters around it.
//!
//! The page creates a handle per mounted chat, calls `mount` once, and
//! re-reads `messages` / `drainEvents` whenever it re-renders.

use std::rc::Rc;

use gloo_utils::format::JsValueSerdeExt;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use mystery_core::controller::SessionController;
use mystery_core::event_bus::EventBus;
use mystery_core::history::load_history;
use mystery_core::ports::{MessageRepository, ModelPort, NoPersistence, PersistHook};
use mystery_core::reconcile::SessionInputs;
use mystery_core::session::{ConversationSession, Invocation, Settlement};
use mystery_platform::hook::RepositoryHook;
use mystery_platform::llm::EdgeFunctionModel;
use mystery_platform::storage::auto_detect_repository;
use mystery_types::config::MysteryConfig;
use mystery_types::preferences::PreferenceSnapshot;

use crate::settings::load_config;

#[wasm_bindgen]
pub struct ChatHandle {
    controller: SessionController,
    event_bus: EventBus,
    repo: Rc<dyn MessageRepository>,
    hook: Option<RepositoryHook>,
    conversation_id: Option<String>,
    preferences: Option<PreferenceSnapshot>,
}

#[wasm_bindgen]
impl ChatHandle {
    /// `preferences` is the form snapshot (camelCase keys) or null.
    #[wasm_bindgen(constructor)]
    pub fn new(conversation_id: Option<String>, preferences: JsValue) -> Result<ChatHandle, JsValue> {
        let preferences = parse_preferences(&preferences)?;
        Ok(Self::with_config(load_config(), conversation_id, preferences))
    }

    /// Load stored history (if any), reconcile, and start the reply owed to
    /// a trailing user turn.
    pub fn mount(&self) {
        let controller = self.controller.clone();
        let repo = self.repo.clone();
        let bus = self.event_bus.clone();
        let hook = self.hook.clone();
        let conversation_id = self.conversation_id.clone();
        let preferences = self.preferences.clone();

        wasm_bindgen_futures::spawn_local(async move {
            let history = match conversation_id.as_deref() {
                Some(id) => load_history(repo.as_ref(), id, &bus).await,
                None => Vec::new(),
            };
            if let Some(hook) = &hook {
                hook.adopt_title(&history);
            }
            let inputs = SessionInputs {
                preferences,
                ..SessionInputs::from_history(history)
            };
            if let Some(invocation) = controller.reconcile(inputs) {
                run_detached(controller, invocation).await;
            }
        });
    }

    /// Send a user turn. Rejected (with a serialized `ChatError`) when the
    /// input is blank or a reply is still being generated.
    pub fn submit(&self, input: &str) -> Result<(), JsValue> {
        let invocation = self.controller.submit(input).map_err(|e| to_js(&e))?;
        self.spawn_run(invocation);
        Ok(())
    }

    /// Regenerate the reply to the latest user turn. Returns false when
    /// there was nothing to retry.
    pub fn retry(&self) -> bool {
        match self.controller.retry() {
            Some(invocation) => {
                self.spawn_run(invocation);
                true
            }
            None => false,
        }
    }

    #[wasm_bindgen(js_name = dismissError)]
    pub fn dismiss_error(&self) {
        self.controller.dismiss_error();
    }

    pub fn unmount(&self) {
        self.controller.unmount();
    }

    pub fn messages(&self) -> JsValue {
        to_js(&self.controller.messages())
    }

    #[wasm_bindgen(js_name = lastError)]
    pub fn last_error(&self) -> JsValue {
        to_js(&self.controller.last_error())
    }

    #[wasm_bindgen(js_name = isPending)]
    pub fn is_pending(&self) -> bool {
        self.controller.is_pending()
    }

    #[wasm_bindgen(js_name = canGenerateFinal)]
    pub fn can_generate_final(&self) -> bool {
        self.controller.can_generate_final()
    }

    pub fn transcript(&self) -> JsValue {
        to_js(&self.controller.transcript())
    }

    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&self) -> JsValue {
        to_js(&self.event_bus.drain())
    }
}

impl ChatHandle {
    /// Wire a handle from an explicit config.
    pub fn with_config(
        config: MysteryConfig,
        conversation_id: Option<String>,
        preferences: Option<PreferenceSnapshot>,
    ) -> Self {
        let event_bus = EventBus::new();
        let repo = auto_detect_repository(&config.storage);
        let model: Rc<dyn ModelPort> = Rc::new(EdgeFunctionModel::new(config.model.clone()));

        let hook = conversation_id
            .as_deref()
            .map(|id| RepositoryHook::new(repo.clone(), id, event_bus.clone()));
        let persist: Rc<dyn PersistHook> = match &hook {
            Some(hook) => Rc::new(hook.clone()),
            None => Rc::new(NoPersistence),
        };

        let session = ConversationSession::new(config.model.tier, config.chat, persist, event_bus.clone());
        log::info!(
            "Chat handle ready (conversation: {}, storage: {}, tier: {})",
            conversation_id.as_deref().unwrap_or("unsaved"),
            repo.backend_name(),
            config.model.tier.as_str()
        );

        Self {
            controller: SessionController::new(session, model),
            event_bus,
            repo,
            hook,
            conversation_id,
            preferences,
        }
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    fn spawn_run(&self, invocation: Invocation) {
        let controller = self.controller.clone();
        wasm_bindgen_futures::spawn_local(run_detached(controller, invocation));
    }
}

async fn run_detached(controller: SessionController, invocation: Invocation) {
    match controller.run(invocation).await {
        Settlement::Replied(message) => log::debug!("Reply {} merged", message.id),
        Settlement::Fallback { error, .. } => log::warn!("Reply replaced by fallback: {}", error),
        Settlement::Discarded => log::debug!("Reply arrived after the session moved on"),
    }
}

pub(crate) fn parse_preferences(value: &JsValue) -> Result<Option<PreferenceSnapshot>, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }
    value
        .into_serde::<PreferenceSnapshot>()
        .map(Some)
        .map_err(|e| JsValue::from_str(&format!("Invalid preferences: {}", e)))
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> JsValue {
    JsValue::from_serde(value).unwrap_or(JsValue::NULL)
}
