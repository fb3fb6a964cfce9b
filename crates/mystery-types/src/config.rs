use serde::{Deserialize, Serialize};

use crate::Result;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MysteryConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

impl MysteryConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Endpoint of the model invocation function (edge function or proxy)
    pub endpoint: String,
    pub api_key: String,
    pub tier: PromptTier,
    pub max_tokens: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "/functions/v1/mystery-ai".to_string(),
            api_key: String::new(),
            tier: PromptTier::Free,
            max_tokens: 1000,
        }
    }
}

/// Selects the system-prompt behavior on the model side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptTier {
    Free,
    Paid,
}

impl PromptTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptTier::Free => "free",
            PromptTier::Paid => "paid",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackendType,
    /// Base URL of the REST backend, e.g. `https://xyz.supabase.co`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest_url: Option<String>,
    pub anon_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageBackendType {
    /// REST when a base URL is configured, memory otherwise
    #[default]
    Auto,
    Memory,
    Rest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Assistant reply appended when the model call fails
    pub fallback_message: String,
    /// Substring that marks a response body as an error report.
    /// `None` disables sniffing and trusts the service's own error signalling.
    pub error_sentinel: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
            error_sentinel: Some(DEFAULT_ERROR_SENTINEL.to_string()),
        }
    }
}

pub const DEFAULT_FALLBACK_MESSAGE: &str =
    "I'm having trouble connecting to my AI service right now. Please try again in a moment.";

pub const DEFAULT_ERROR_SENTINEL: &str = "There was an error";
