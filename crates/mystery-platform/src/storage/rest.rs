//! PostgREST message repository (Supabase-style `rest/v1` API).
//!
//! Rows live in a `messages` table keyed by `conversation_id`; titles live
//! on the `conversations` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gloo_net::http::{Request, RequestBuilder, Response};
use serde_json::{json, Value};

use mystery_core::ports::MessageRepository;
use mystery_types::{MysteryError, Result, message::Message, stored::StoredMessage};

pub struct RestRepository {
    base_url: String,
    anon_key: String,
}

impl RestRepository {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    pub(crate) fn messages_url(&self) -> String {
        format!("{}/rest/v1/messages", self.base_url)
    }

    pub(crate) fn history_url(&self, conversation_id: &str) -> String {
        format!(
            "{}?select=*&conversation_id=eq.{}&order=created_at.asc",
            self.messages_url(),
            urlencoding::encode(conversation_id)
        )
    }

    pub(crate) fn conversation_url(&self, conversation_id: &str) -> String {
        format!(
            "{}/rest/v1/conversations?id=eq.{}",
            self.base_url,
            urlencoding::encode(conversation_id)
        )
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .header("Authorization", &format!("Bearer {}", self.anon_key))
            .header("Content-Type", "application/json")
    }
}

#[async_trait(?Send)]
impl MessageRepository for RestRepository {
    async fn append(&self, conversation_id: &str, message: &Message) -> Result<()> {
        let response = self
            .authorize(Request::post(&self.messages_url()))
            .header("Prefer", "return=minimal")
            .json(&insert_body(conversation_id, message))
            .map_err(|e| MysteryError::Storage(e.to_string()))?
            .send()
            .await
            .map_err(|e| MysteryError::Network(e.to_string()))?;
        check_status(response).await?;
        Ok(())
    }

    async fn list_by_conversation(&self, conversation_id: &str) -> Result<Vec<StoredMessage>> {
        let response = self
            .authorize(Request::get(&self.history_url(conversation_id)))
            .send()
            .await
            .map_err(|e| MysteryError::Network(e.to_string()))?;
        let response = check_status(response).await?;

        response
            .json::<Vec<StoredMessage>>()
            .await
            .map_err(|e| MysteryError::Serialization(e.to_string()))
    }

    async fn update_title(&self, conversation_id: &str, title: &str) -> Result<()> {
        let response = self
            .authorize(Request::patch(&self.conversation_url(conversation_id)))
            .header("Prefer", "return=minimal")
            .json(&title_body(title, Utc::now()))
            .map_err(|e| MysteryError::Storage(e.to_string()))?
            .send()
            .await
            .map_err(|e| MysteryError::Network(e.to_string()))?;
        check_status(response).await?;
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "rest"
    }
}

async fn check_status(response: Response) -> Result<Response> {
    if response.ok() {
        return Ok(response);
    }
    let status = response.status();
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    Err(MysteryError::Storage(format!("HTTP {}: {}", status, text)))
}

pub(crate) fn insert_body(conversation_id: &str, message: &Message) -> Value {
    json!({
        "conversation_id": conversation_id,
        "content": message.content,
        "role": message.author.as_str(),
    })
}

pub(crate) fn title_body(title: &str, now: DateTime<Utc>) -> Value {
    json!({
        "title": title,
        "updated_at": now.to_rfc3339(),
    })
}
