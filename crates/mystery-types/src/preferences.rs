use std::fmt;

use serde::{Deserialize, Serialize};

/// How much detail the character scripts should carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptType {
    #[serde(rename = "full")]
    Full,
    #[serde(rename = "pointForm")]
    PointForm,
}

impl ScriptType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptType::Full => "full",
            ScriptType::PointForm => "pointForm",
        }
    }
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form answers captured before the chat starts. Immutable once handed to a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceSnapshot {
    #[serde(default)]
    pub theme: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_accomplice: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_type: Option<ScriptType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_details: Option<String>,
}

impl PreferenceSnapshot {
    pub fn with_theme(theme: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
            ..Self::default()
        }
    }

    pub fn theme(&self) -> Option<&str> {
        non_empty(&self.theme)
    }

    /// A count of zero is treated as "not given"
    pub fn player_count(&self) -> Option<u32> {
        self.player_count.filter(|n| *n > 0)
    }

    pub fn additional_details(&self) -> Option<&str> {
        self.additional_details.as_deref().and_then(non_empty)
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
