//! Session controller: pairs a [`ConversationSession`] with a model service.
//!
//! The session lives in an `Rc<RefCell<_>>` so the host, spawned model
//! calls and event handlers can share it on the single UI thread. No borrow is
//! held across the model call: the request is taken out under a short borrow,
//! awaited with the session released, and merged back under another.

use std::cell::RefCell;
use std::rc::Rc;

use mystery_types::{ChatError, message::Message};

use crate::ports::ModelPort;
use crate::reconcile::SessionInputs;
use crate::session::{ConversationSession, Invocation, Phase, ReconcileOutcome, Settlement};

#[derive(Clone)]
pub struct SessionController {
    session: Rc<RefCell<ConversationSession>>,
    model: Rc<dyn ModelPort>,
}

impl SessionController {
    pub fn new(session: ConversationSession, model: Rc<dyn ModelPort>) -> Self {
        Self {
            session: Rc::new(RefCell::new(session)),
            model,
        }
    }

    /// Reconcile once; returns the auto-invocation owed to a trailing user
    /// turn, if any. Safe to call on every re-render.
    pub fn reconcile(&self, inputs: SessionInputs) -> Option<Invocation> {
        match self.session.borrow_mut().reconcile(inputs) {
            ReconcileOutcome::Ready(owed) => owed,
            ReconcileOutcome::Deferred
            | ReconcileOutcome::AlreadyInitialized
            | ReconcileOutcome::Closed => None,
        }
    }

    pub fn submit(&self, input: &str) -> Result<Invocation, ChatError> {
        self.session.borrow_mut().submit(input)
    }

    pub fn retry(&self) -> Option<Invocation> {
        self.session.borrow_mut().retry()
    }

    /// Perform a committed model call and merge its result.
    ///
    /// Must be spawned (e.g. `wasm_bindgen_futures::spawn_local`) by UI hosts;
    /// it never blocks the thread.
    pub async fn run(&self, invocation: Invocation) -> Settlement {
        let Invocation { ticket, request } = invocation;
        log::debug!(
            "Invoking {} with {} messages (tier {})",
            self.model.service_name(),
            request.messages.len(),
            request.tier.as_str()
        );
        let outcome = self.model.invoke(request).await;
        self.session.borrow_mut().settle(ticket, outcome)
    }

    /// Submit and await the reply in one step.
    pub async fn send(&self, input: &str) -> Result<Settlement, ChatError> {
        let invocation = self.submit(input)?;
        Ok(self.run(invocation).await)
    }

    /// Detach from the host; in-flight results are dropped on arrival.
    pub fn unmount(&self) {
        self.session.borrow_mut().close();
        log::debug!("Session {} unmounted", self.session.borrow().id());
    }

    pub fn dismiss_error(&self) {
        self.session.borrow_mut().dismiss_error();
    }

    pub fn messages(&self) -> Vec<Message> {
        self.session.borrow().messages().to_vec()
    }

    pub fn last_error(&self) -> Option<ChatError> {
        self.session.borrow().last_error().cloned()
    }

    pub fn is_pending(&self) -> bool {
        self.session.borrow().is_pending()
    }

    pub fn phase(&self) -> Phase {
        self.session.borrow().phase()
    }

    pub fn can_generate_final(&self) -> bool {
        self.session.borrow().can_generate_final()
    }

    pub fn transcript(&self) -> Vec<Message> {
        self.session.borrow().transcript()
    }
}
