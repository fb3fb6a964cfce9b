use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who wrote a turn. Only the two conversational roles exist at this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Assistant,
}

impl Author {
    pub fn as_str(&self) -> &'static str {
        match self {
            Author::User => "user",
            Author::Assistant => "assistant",
        }
    }

    pub fn is_ai(&self) -> bool {
        matches!(self, Author::Assistant)
    }
}

/// A single turn in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub author: Author,
    /// Only used to order history read back from storage
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(author: Author, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            author,
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Author::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Author::Assistant, content)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn is_ai(&self) -> bool {
        self.author.is_ai()
    }

    /// Role/content form sent to the model
    pub fn to_turn(&self) -> ChatTurn {
        ChatTurn {
            role: self.author,
            content: self.content.clone(),
        }
    }
}

/// A role-tagged turn as the model invocation service sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Author,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Author::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Author::Assistant, content: content.into() }
    }
}
