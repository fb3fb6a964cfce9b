//! Model adapter for the mystery generation endpoint.
//!
//! Posts the whole conversation plus the prompt tier and reads back a single
//! reply. The endpoint answers in the chat-completions shape
//! (`choices[0].message.content`); a raw Anthropic messages body
//! (`content[0].text`) is accepted as well.
//! Uses browser `fetch()` via gloo-net for WASM compatibility.

use async_trait::async_trait;
use gloo_net::http::Request;
use serde::Deserialize;
use serde_json::{json, Value};

use mystery_core::ports::{ModelPort, ModelRequest};
use mystery_types::{
    MysteryError, Result,
    config::{ModelConfig, PromptTier},
    message::ChatTurn,
};

pub const FREE_SYSTEM_PROMPT: &str = "You are an AI assistant that helps create murder mystery party games. \
     Create an engaging storyline and suggest character ideas, but don't provide complete details as this is a preview.";

pub const PAID_SYSTEM_PROMPT: &str = "You are an AI assistant that helps create detailed murder mystery party games. \
     Since the user has purchased, provide complete character details, clues, and all game materials.";

pub fn tier_prompt(tier: PromptTier) -> &'static str {
    match tier {
        PromptTier::Free => FREE_SYSTEM_PROMPT,
        PromptTier::Paid => PAID_SYSTEM_PROMPT,
    }
}

pub struct EdgeFunctionModel {
    config: ModelConfig,
}

impl EdgeFunctionModel {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    pub(crate) fn build_request_body(&self, req: &ModelRequest) -> Value {
        let messages: Vec<Value> = req.messages.iter().map(turn_to_json).collect();

        json!({
            "messages": messages,
            "promptVersion": req.tier.as_str(),
            "system": system_text(req),
            "max_tokens": self.config.max_tokens,
        })
    }
}

#[async_trait(?Send)]
impl ModelPort for EdgeFunctionModel {
    async fn invoke(&self, req: ModelRequest) -> Result<String> {
        let body = self.build_request_body(&req);

        let mut builder = Request::post(&self.config.endpoint)
            .header("Content-Type", "application/json");
        if !self.config.api_key.is_empty() {
            builder = builder
                .header("Authorization", &format!("Bearer {}", self.config.api_key))
                .header("apikey", &self.config.api_key);
        }

        let response = builder
            .json(&body)
            .map_err(|e| MysteryError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| MysteryError::Network(e.to_string()))?;

        if !response.ok() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(MysteryError::Model(format!("HTTP {}: {}", status, text)));
        }

        let text = response
            .text()
            .await
            .map_err(|e| MysteryError::Model(e.to_string()))?;
        parse_response(&text)
    }

    fn service_name(&self) -> &str {
        "mystery-ai"
    }
}

// ─── API response types ──────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum ApiResponse {
    Completion { choices: Vec<ApiChoice> },
    Messages { content: Vec<ApiContentBlock> },
}

#[derive(Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiContentBlock {
    #[serde(default)]
    text: Option<String>,
}

// ─── Serialization helpers ───────────────────────────────────

fn turn_to_json(turn: &ChatTurn) -> Value {
    json!({
        "role": turn.role.as_str(),
        "content": turn.content,
        "is_ai": turn.role.is_ai(),
    })
}

/// Tier prompt, followed by the preference reminder when there is one.
pub(crate) fn system_text(req: &ModelRequest) -> String {
    let base = tier_prompt(req.tier);
    match req.system_instruction.as_deref() {
        Some(instruction) if !instruction.is_empty() => format!("{}\n\n{}", base, instruction),
        _ => base.to_string(),
    }
}

/// Extract the reply text. An empty reply is returned as-is; judging it is
/// the session's job.
pub(crate) fn parse_response(body: &str) -> Result<String> {
    let data: ApiResponse =
        serde_json::from_str(body).map_err(|e| MysteryError::Model(e.to_string()))?;

    let text = match data {
        ApiResponse::Completion { choices } => choices
            .into_iter()
            .next()
            .ok_or_else(|| MysteryError::Model("No choices in response".to_string()))?
            .message
            .content,
        ApiResponse::Messages { content } => content
            .into_iter()
            .next()
            .ok_or_else(|| MysteryError::Model("No content in response".to_string()))?
            .text,
    };
    Ok(text.unwrap_or_default())
}
