//! Message rows as the repository hands them back.
//!
//! Rows written by different front ends disagree on how the author is
//! encoded: some carry `role: "assistant" | "user"`, older ones an `is_ai`
//! flag. Both collapse to [`Author`] here and nowhere else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::{Author, Message};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_ai: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl StoredMessage {
    pub fn new(author: Author, content: impl Into<String>) -> Self {
        Self {
            id: None,
            content: content.into(),
            role: Some(author.as_str().to_string()),
            is_ai: None,
            created_at: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    /// `role` wins over `is_ai`; a row with neither is a user turn.
    pub fn author(&self) -> Author {
        match (self.role.as_deref(), self.is_ai) {
            (Some(role), _) if role.eq_ignore_ascii_case("assistant") => Author::Assistant,
            (Some(_), _) => Author::User,
            (None, Some(true)) => Author::Assistant,
            (None, _) => Author::User,
        }
    }

    /// Convert to a session message. Rows missing an id get a generated one,
    /// rows missing a creation time are stamped with `now`.
    pub fn into_message(self, now: DateTime<Utc>) -> Message {
        let author = self.author();
        let id = self
            .id
            .unwrap_or_else(|| format!("msg-{}", uuid::Uuid::new_v4()));
        Message {
            id,
            content: self.content,
            author,
            timestamp: self.created_at.unwrap_or(now),
        }
    }

    /// Row form of a session message, as written by the repositories
    pub fn from_message(message: &Message) -> Self {
        Self {
            id: Some(message.id.clone()),
            content: message.content.clone(),
            role: Some(message.author.as_str().to_string()),
            is_ai: None,
            created_at: Some(message.timestamp),
        }
    }
}
