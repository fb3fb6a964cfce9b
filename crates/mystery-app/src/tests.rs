#[cfg(test)]
mod tests {
    use crate::settings::config_from_stored;
    use mystery_types::config::{PromptTier, StorageBackendType, DEFAULT_FALLBACK_MESSAGE};

    // ─── Stored Config Tests ─────────────────────────────────

    #[test]
    fn test_missing_config_uses_defaults() {
        let config = config_from_stored(None);
        assert_eq!(config.model.tier, PromptTier::Free);
        assert_eq!(config.storage.backend, StorageBackendType::Auto);
        assert_eq!(config.chat.fallback_message, DEFAULT_FALLBACK_MESSAGE);
    }

    #[test]
    fn test_stored_config_is_applied() {
        let raw = r#"{"model":{"tier":"paid"},"storage":{"backend":"Rest","rest_url":"https://db.example.co"}}"#;
        let config = config_from_stored(Some(raw));
        assert_eq!(config.model.tier, PromptTier::Paid);
        assert_eq!(config.model.max_tokens, 1000);
        assert_eq!(config.storage.backend, StorageBackendType::Rest);
        assert_eq!(config.storage.rest_url.as_deref(), Some("https://db.example.co"));
    }

    #[test]
    fn test_corrupt_config_is_ignored() {
        let config = config_from_stored(Some("{not json"));
        assert_eq!(config.model.tier, PromptTier::Free);
    }
}
