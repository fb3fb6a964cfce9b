//! History reconciliation: turn stored rows and form preferences into the
//! session's initial message list.

use chrono::{DateTime, Utc};
use mystery_types::{
    message::Message,
    preferences::PreferenceSnapshot,
    stored::StoredMessage,
};

use crate::prompt::initial_prompt;

/// Id of the user message derived from preferences when it is prepended to
/// stored history.
pub const INITIAL_MESSAGE_ID: &str = "initial-message";

/// What the host knows when it mounts (or re-renders) a session.
#[derive(Debug, Clone, Default)]
pub struct SessionInputs {
    pub history: Vec<StoredMessage>,
    /// History is still being fetched; reconciliation waits for it
    pub loading_history: bool,
    pub preferences: Option<PreferenceSnapshot>,
}

impl SessionInputs {
    pub fn loading() -> Self {
        Self {
            loading_history: true,
            ..Self::default()
        }
    }

    pub fn from_history(history: Vec<StoredMessage>) -> Self {
        Self {
            history,
            ..Self::default()
        }
    }

    pub fn from_preferences(preferences: PreferenceSnapshot) -> Self {
        Self {
            preferences: Some(preferences),
            ..Self::default()
        }
    }

    pub fn with_preferences(mut self, preferences: PreferenceSnapshot) -> Self {
        self.preferences = Some(preferences);
        self
    }
}

/// Build the initial message list.
///
/// - Stored history is adopted and sorted by timestamp (stable, so rows with
///   equal timestamps keep their delivery order). When the preferences carry
///   additional details and the first stored turn is not the assistant's, the
///   preference prompt is prepended, unless that turn already is the prompt.
/// - Without history, a themed snapshot yields exactly one user message.
/// - Otherwise the list is empty.
pub fn reconcile_history(
    history: Vec<StoredMessage>,
    prefs: Option<&PreferenceSnapshot>,
    now: DateTime<Utc>,
) -> Vec<Message> {
    if !history.is_empty() {
        let mut messages: Vec<Message> = history
            .into_iter()
            .map(|row| row.into_message(now))
            .collect();
        messages.sort_by_key(|m| m.timestamp);

        if let Some(prefs) = prefs.filter(|p| p.additional_details().is_some()) {
            let prompt = initial_prompt(prefs);
            let needs_prompt = messages
                .first()
                .map_or(false, |first| !first.is_ai() && first.content != prompt);
            if needs_prompt {
                log::debug!("Prepending preference prompt to {} stored messages", messages.len());
                let derived = Message::user(prompt)
                    .with_id(INITIAL_MESSAGE_ID)
                    .at(DateTime::<Utc>::default());
                messages.insert(0, derived);
            }
        }
        return messages;
    }

    match prefs {
        Some(prefs) if prefs.theme().is_some() => {
            vec![Message::user(initial_prompt(prefs)).at(now)]
        }
        _ => Vec::new(),
    }
}
