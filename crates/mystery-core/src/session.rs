//! Conversation session: the state machine behind one chat.
//!
//! Driven by discrete events: `reconcile`, `submit`, `settle`, `retry`,
//! `close`. Each event is synchronous; the model call between `submit` and
//! `settle` is the caller's to await (see [`crate::controller`]).
//!
//! ```text
//! Idle ──submit/retry/reply owed──▶ Invoking ──settle(ok)──▶ Settled (≡ Idle)
//!                                       └──────settle(err)──▶ Failed  (≡ Idle, last_error set)
//! ```

use std::rc::Rc;

use chrono::Utc;
use mystery_types::{
    ChatError,
    config::{ChatConfig, PromptTier},
    event::SessionEvent,
    message::{Author, Message},
};
use uuid::Uuid;

use crate::event_bus::EventBus;
use crate::ports::{ModelRequest, PersistHook};
use crate::prompt::system_instruction;
use crate::reconcile::{reconcile_history, SessionInputs};

/// Identifies one model call of one session. A result is only merged if its
/// ticket is the one the session is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub session: Uuid,
    pub seq: u64,
}

/// A model call the session has committed to. Hand it to the model service
/// and feed the result back through [`ConversationSession::settle`].
#[derive(Debug, Clone)]
pub struct Invocation {
    pub ticket: Ticket,
    pub request: ModelRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Invoking,
    Settled,
    Failed,
}

#[derive(Debug)]
pub enum ReconcileOutcome {
    /// History is still loading; try again once it has arrived
    Deferred,
    /// Reconciliation already ran for this session
    AlreadyInitialized,
    /// The host unmounted before reconciliation could run
    Closed,
    /// Message list established. Carries the model call owed to a trailing
    /// user turn, if any.
    Ready(Option<Invocation>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    Replied(Message),
    Fallback { message: Message, error: ChatError },
    /// Result for a call the session no longer waits on
    Discarded,
}

pub struct ConversationSession {
    id: Uuid,
    messages: Vec<Message>,
    pending: Option<Ticket>,
    last_error: Option<ChatError>,
    phase: Phase,
    initialized: bool,
    closed: bool,
    seq: u64,
    tier: PromptTier,
    system_instruction: Option<String>,
    chat: ChatConfig,
    hook: Rc<dyn PersistHook>,
    event_bus: EventBus,
}

impl ConversationSession {
    pub fn new(
        tier: PromptTier,
        chat: ChatConfig,
        hook: Rc<dyn PersistHook>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            messages: Vec::new(),
            pending: None,
            last_error: None,
            phase: Phase::Idle,
            initialized: false,
            closed: false,
            seq: 0,
            tier,
            system_instruction: None,
            chat,
            hook,
            event_bus,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_error(&self) -> Option<&ChatError> {
        self.last_error.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The "Generate Final Mystery" hand-off is offered once the model has
    /// had a chance to reply and nothing is in flight.
    pub fn can_generate_final(&self) -> bool {
        self.messages.len() > 1 && !self.is_pending()
    }

    /// Ordered copy of the conversation for the final generation step
    pub fn transcript(&self) -> Vec<Message> {
        self.messages.clone()
    }

    /// Hide the error banner without retrying
    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    /// Establish the initial message list. Runs once per session; later
    /// calls are no-ops whatever the inputs.
    pub fn reconcile(&mut self, inputs: SessionInputs) -> ReconcileOutcome {
        if self.closed {
            log::debug!("Session {}: closed, skipping reconciliation", self.id);
            return ReconcileOutcome::Closed;
        }
        if self.initialized {
            return ReconcileOutcome::AlreadyInitialized;
        }
        if inputs.loading_history {
            log::debug!("Session {}: history still loading, deferring", self.id);
            return ReconcileOutcome::Deferred;
        }

        let SessionInputs { history, preferences, .. } = inputs;
        self.system_instruction = preferences.as_ref().map(system_instruction);
        self.messages = reconcile_history(history, preferences.as_ref(), Utc::now());
        self.initialized = true;

        let reply_owed = self
            .messages
            .last()
            .map_or(false, |m| m.author == Author::User);
        log::info!(
            "Session {} reconciled with {} messages (reply owed: {})",
            self.id,
            self.messages.len(),
            reply_owed
        );
        self.event_bus.emit(SessionEvent::Reconciled {
            message_count: self.messages.len(),
            reply_owed,
        });

        if reply_owed {
            ReconcileOutcome::Ready(Some(self.begin_invocation()))
        } else {
            ReconcileOutcome::Ready(None)
        }
    }

    /// Append a user turn and commit to a model call for it.
    ///
    /// Blank input, input arriving while a call is in flight, and input after
    /// `close` are rejected without touching any state.
    pub fn submit(&mut self, input: &str) -> Result<Invocation, ChatError> {
        let content = input.trim();
        if content.is_empty() {
            return Err(ChatError::EmptySubmission);
        }
        if self.closed {
            return Err(ChatError::SessionClosed);
        }
        if self.pending.is_some() {
            log::debug!("Session {}: submission ignored, reply in progress", self.id);
            return Err(ChatError::InvocationPending);
        }
        if !self.initialized {
            // The conversation has started; late history must not reorder it.
            self.initialized = true;
        }

        self.last_error = None;
        self.finalize(Message::user(content));
        Ok(self.begin_invocation())
    }

    /// Merge the outcome of a model call.
    pub fn settle(&mut self, ticket: Ticket, outcome: mystery_types::Result<String>) -> Settlement {
        if self.closed || self.pending != Some(ticket) {
            log::warn!(
                "Session {}: discarding stale response #{} for session {}",
                self.id,
                ticket.seq,
                ticket.session
            );
            self.event_bus.emit(SessionEvent::StaleResponseDiscarded { seq: ticket.seq });
            return Settlement::Discarded;
        }
        self.pending = None;

        match self.check_response(outcome) {
            Ok(text) => {
                let reply = Message::assistant(text);
                self.finalize(reply.clone());
                self.phase = Phase::Settled;
                self.event_bus.emit(SessionEvent::InvocationSucceeded { seq: ticket.seq });
                Settlement::Replied(reply)
            }
            Err(error) => {
                log::error!("Session {}: model call #{} failed: {}", self.id, ticket.seq, error);
                self.last_error = Some(error.clone());
                let fallback = Message::assistant(self.chat.fallback_message.clone());
                self.finalize(fallback.clone());
                self.phase = Phase::Failed;
                self.event_bus.emit(SessionEvent::InvocationFailed {
                    seq: ticket.seq,
                    error: error.clone(),
                });
                Settlement::Fallback { message: fallback, error }
            }
        }
    }

    /// Cut the conversation back to the most recent user turn and ask again.
    ///
    /// No-op when there is no user turn, a call is already in flight, or the
    /// session is closed.
    pub fn retry(&mut self) -> Option<Invocation> {
        if self.closed || self.pending.is_some() {
            return None;
        }
        let last_user = self.messages.iter().rposition(|m| m.author == Author::User)?;
        self.messages.truncate(last_user + 1);
        self.last_error = None;
        log::info!("Session {}: retrying from message {}", self.id, last_user);
        self.event_bus.emit(SessionEvent::Retried {
            message_count: self.messages.len(),
        });
        Some(self.begin_invocation())
    }

    /// The host is going away. Outstanding results will be discarded.
    pub fn close(&mut self) {
        self.closed = true;
        self.pending = None;
    }

    fn begin_invocation(&mut self) -> Invocation {
        self.seq += 1;
        let ticket = Ticket { session: self.id, seq: self.seq };
        self.pending = Some(ticket);
        self.phase = Phase::Invoking;

        let request = ModelRequest {
            messages: self.messages.iter().map(Message::to_turn).collect(),
            tier: self.tier,
            system_instruction: self.system_instruction.clone(),
        };
        self.event_bus.emit(SessionEvent::InvocationStarted {
            seq: ticket.seq,
            message_count: request.messages.len(),
        });
        Invocation { ticket, request }
    }

    /// Append a message and report it to the persistence hook, once.
    fn finalize(&mut self, message: Message) {
        self.messages.push(message.clone());
        self.event_bus.emit(SessionEvent::MessageAppended { message: message.clone() });
        self.hook.persist(&message);
    }

    fn check_response(&self, outcome: mystery_types::Result<String>) -> Result<String, ChatError> {
        let text = outcome.map_err(|e| ChatError::TransportFailure(e.to_string()))?;
        if text.trim().is_empty() {
            return Err(ChatError::MalformedResponse(
                "Failed to get a response from AI".to_string(),
            ));
        }
        if let Some(sentinel) = self.chat.error_sentinel.as_deref() {
            if !sentinel.is_empty() && text.contains(sentinel) {
                return Err(ChatError::MalformedResponse(text));
            }
        }
        Ok(text)
    }
}
