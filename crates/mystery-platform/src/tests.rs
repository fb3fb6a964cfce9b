#[cfg(test)]
mod tests {
    use crate::hook::RepositoryHook;
    use crate::llm::edge_function::*;
    use crate::storage::rest::{insert_body, title_body};
    use crate::storage::{auto_detect_repository, MemoryRepository, RestRepository};
    use mystery_core::event_bus::EventBus;
    use mystery_core::ports::{MessageRepository, ModelRequest};
    use mystery_types::config::{ModelConfig, PromptTier, StorageBackendType, StorageConfig};
    use mystery_types::event::SessionEvent;
    use mystery_types::message::*;
    use mystery_types::stored::StoredMessage;
    use mystery_types::{ChatError, MysteryError};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::rc::Rc;

    // Simple single-threaded executor; every future here resolves without I/O
    fn block_on<F: std::future::Future<Output = T>, T>(f: F) -> T {
        use std::task::{Context, Poll, Wake, Waker};
        use std::sync::Arc;

        struct NoopWaker;
        impl Wake for NoopWaker {
            fn wake(self: Arc<Self>) {}
        }

        let waker = Waker::from(Arc::new(NoopWaker));
        let mut cx = Context::from_waker(&waker);
        let mut f = std::pin::pin!(f);

        loop {
            match f.as_mut().poll(&mut cx) {
                Poll::Ready(val) => return val,
                Poll::Pending => std::thread::yield_now(),
            }
        }
    }

    fn request(tier: PromptTier, instruction: Option<&str>) -> ModelRequest {
        ModelRequest {
            messages: vec![ChatTurn::user("A"), ChatTurn::assistant("B"), ChatTurn::user("C")],
            tier,
            system_instruction: instruction.map(str::to_string),
        }
    }

    // ─── Edge Function Tests ─────────────────────────────────

    #[test]
    fn test_request_body_shape() {
        let model = EdgeFunctionModel::new(ModelConfig::default());
        let body = model.build_request_body(&request(PromptTier::Free, None));

        assert_eq!(body["promptVersion"], "free");
        assert_eq!(body["max_tokens"], 1000);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["is_ai"], false);
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(messages[1]["is_ai"], true);
        assert_eq!(messages[2]["content"], "C");
    }

    #[test]
    fn test_request_body_paid_tier() {
        let config = ModelConfig { max_tokens: 4000, ..ModelConfig::default() };
        let model = EdgeFunctionModel::new(config);
        let body = model.build_request_body(&request(PromptTier::Paid, None));
        assert_eq!(body["promptVersion"], "paid");
        assert_eq!(body["max_tokens"], 4000);
        assert_eq!(body["system"], PAID_SYSTEM_PROMPT);
    }

    #[test]
    fn test_system_text_appends_instruction() {
        let text = system_text(&request(PromptTier::Free, Some("Theme: noir.")));
        assert!(text.starts_with(FREE_SYSTEM_PROMPT));
        assert!(text.ends_with("\n\nTheme: noir."));

        let bare = system_text(&request(PromptTier::Free, Some("")));
        assert_eq!(bare, FREE_SYSTEM_PROMPT);
    }

    #[test]
    fn test_tier_prompts_differ() {
        assert_ne!(tier_prompt(PromptTier::Free), tier_prompt(PromptTier::Paid));
        assert!(tier_prompt(PromptTier::Free).contains("preview"));
    }

    #[test]
    fn test_parse_completion_response() {
        let body = r##"{"choices":[{"message":{"content":"# The Last Toast"}}],"model":"m","id":"x"}"##;
        assert_eq!(parse_response(body).unwrap(), "# The Last Toast");
    }

    #[test]
    fn test_parse_messages_response() {
        let body = r#"{"id":"msg_1","content":[{"type":"text","text":"Hello"}]}"#;
        assert_eq!(parse_response(body).unwrap(), "Hello");
    }

    #[test]
    fn test_parse_missing_content_is_empty() {
        let body = r#"{"choices":[{"message":{}}]}"#;
        assert_eq!(parse_response(body).unwrap(), "");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_response(r#"{"choices":[]}"#), Err(MysteryError::Model(_))));
        assert!(matches!(parse_response(r#"{"error":"boom"}"#), Err(MysteryError::Model(_))));
        assert!(matches!(parse_response("not json"), Err(MysteryError::Model(_))));
    }

    // ─── Repository Tests ────────────────────────────────────

    #[test]
    fn test_memory_repository_roundtrip() {
        let repo = MemoryRepository::new();
        block_on(repo.append("c1", &Message::user("A"))).unwrap();
        block_on(repo.append("c1", &Message::assistant("B"))).unwrap();
        block_on(repo.append("c2", &Message::user("other"))).unwrap();

        let rows = block_on(repo.list_by_conversation("c1")).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].author(), Author::User);
        assert_eq!(rows[1].author(), Author::Assistant);
        assert!(block_on(repo.list_by_conversation("missing")).unwrap().is_empty());
    }

    #[test]
    fn test_memory_repository_titles() {
        let repo = MemoryRepository::new();
        assert!(repo.title("c1").is_none());
        block_on(repo.update_title("c1", "Murder Most Foul")).unwrap();
        assert_eq!(repo.title("c1").as_deref(), Some("Murder Most Foul"));
    }

    #[test]
    fn test_rest_urls() {
        let repo = RestRepository::new("https://db.example.co/", "anon");
        assert_eq!(repo.messages_url(), "https://db.example.co/rest/v1/messages");
        assert_eq!(
            repo.history_url("c1"),
            "https://db.example.co/rest/v1/messages?select=*&conversation_id=eq.c1&order=created_at.asc"
        );
        assert_eq!(
            repo.conversation_url("c1"),
            "https://db.example.co/rest/v1/conversations?id=eq.c1"
        );
    }

    #[test]
    fn test_rest_urls_encode_conversation_id() {
        let repo = RestRepository::new("https://db.example.co", "anon");
        assert_eq!(
            repo.history_url("a&b,c)"),
            "https://db.example.co/rest/v1/messages?select=*&conversation_id=eq.a%26b%2Cc%29&order=created_at.asc"
        );
        assert_eq!(
            repo.conversation_url("x y"),
            "https://db.example.co/rest/v1/conversations?id=eq.x%20y"
        );
    }

    #[test]
    fn test_rest_bodies() {
        let body = insert_body("c1", &Message::assistant("B"));
        assert_eq!(body["conversation_id"], "c1");
        assert_eq!(body["content"], "B");
        assert_eq!(body["role"], "assistant");

        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let body = title_body("The Last Toast", at);
        assert_eq!(body["title"], "The Last Toast");
        assert_eq!(body["updated_at"], "2024-05-01T12:00:00+00:00");
    }

    #[test]
    fn test_rest_rows_deserialize() {
        let json = r#"[
            {"id":"1","conversation_id":"c1","content":"A","role":"user","created_at":"2024-05-01T12:00:00.123456+00:00"},
            {"id":"2","conversation_id":"c1","content":"B","is_ai":true,"created_at":"2024-05-01T12:00:05+00:00"}
        ]"#;
        let rows: Vec<StoredMessage> = serde_json::from_str(json).unwrap();
        assert_eq!(rows[0].author(), Author::User);
        assert_eq!(rows[1].author(), Author::Assistant);
        assert!(rows[0].created_at < rows[1].created_at);
    }

    #[test]
    fn test_auto_detect_repository() {
        let memory = auto_detect_repository(&StorageConfig::default());
        assert_eq!(memory.backend_name(), "memory");

        let rest = auto_detect_repository(&StorageConfig {
            rest_url: Some("https://db.example.co".to_string()),
            anon_key: "anon".to_string(),
            ..StorageConfig::default()
        });
        assert_eq!(rest.backend_name(), "rest");

        let forced = auto_detect_repository(&StorageConfig {
            backend: StorageBackendType::Memory,
            rest_url: Some("https://db.example.co".to_string()),
            ..StorageConfig::default()
        });
        assert_eq!(forced.backend_name(), "memory");

        let unconfigured = auto_detect_repository(&StorageConfig {
            backend: StorageBackendType::Rest,
            ..StorageConfig::default()
        });
        assert_eq!(unconfigured.backend_name(), "memory");
    }

    // ─── Persistence Hook Tests ──────────────────────────────

    struct FailingRepo;

    #[async_trait(?Send)]
    impl MessageRepository for FailingRepo {
        async fn append(&self, _conversation_id: &str, _message: &Message) -> mystery_types::Result<()> {
            Err(MysteryError::Storage("HTTP 401: permission denied".to_string()))
        }

        async fn list_by_conversation(&self, _conversation_id: &str) -> mystery_types::Result<Vec<StoredMessage>> {
            Ok(Vec::new())
        }

        async fn update_title(&self, _conversation_id: &str, _title: &str) -> mystery_types::Result<()> {
            Ok(())
        }

        fn backend_name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_hook_saves_and_titles() {
        let repo = Rc::new(MemoryRepository::new());
        let bus = EventBus::new();
        let hook = RepositoryHook::new(repo.clone(), "c1", bus.clone());

        block_on(hook.persist_now(&Message::user("# \"Not A Title\"")));
        assert!(repo.title("c1").is_none());

        block_on(hook.persist_now(&Message::assistant("# \"THE LAST TOAST\" - A MURDER MYSTERY")));
        assert_eq!(repo.title("c1").as_deref(), Some("The Last Toast"));
        assert_eq!(block_on(repo.list_by_conversation("c1")).unwrap().len(), 2);

        let events = bus.drain();
        assert!(matches!(events.as_slice(), [SessionEvent::TitleUpdated { title }] if title == "The Last Toast"));
    }

    #[test]
    fn test_hook_skips_unchanged_title() {
        let repo = Rc::new(MemoryRepository::new());
        let bus = EventBus::new();
        let hook = RepositoryHook::new(repo, "c1", bus.clone());

        block_on(hook.persist_now(&Message::assistant("Title: Poison Pen")));
        block_on(hook.persist_now(&Message::assistant("Title: Poison Pen")));
        assert_eq!(bus.drain().len(), 1);
    }

    #[test]
    fn test_hook_keeps_first_title() {
        let repo = Rc::new(MemoryRepository::new());
        let bus = EventBus::new();
        let hook = RepositoryHook::new(repo.clone(), "c1", bus.clone());

        block_on(hook.persist_now(&Message::assistant("# \"The Last Toast\" - A MURDER MYSTERY")));
        block_on(hook.persist_now(&Message::assistant("## Characters\n- The butler")));
        block_on(hook.persist_now(&Message::assistant("Player #3 is now the accomplice.")));

        assert_eq!(repo.title("c1").as_deref(), Some("The Last Toast"));
        assert_eq!(block_on(repo.list_by_conversation("c1")).unwrap().len(), 3);
        assert_eq!(bus.drain().len(), 1);
    }

    #[test]
    fn test_hook_adopts_title_from_history() {
        let repo = Rc::new(MemoryRepository::new());
        let bus = EventBus::new();
        let hook = RepositoryHook::new(repo.clone(), "c1", bus.clone());
        hook.adopt_title(&[
            StoredMessage::new(Author::User, "Let's create a murder mystery."),
            StoredMessage::new(Author::Assistant, "# \"Poison Pen\""),
        ]);

        block_on(hook.persist_now(&Message::assistant("## Clues")));
        assert!(repo.title("c1").is_none());
        assert!(!bus.has_pending());
    }

    #[test]
    fn test_hook_reports_failure() {
        let bus = EventBus::new();
        let hook = RepositoryHook::new(Rc::new(FailingRepo), "c1", bus.clone());
        let message = Message::assistant("# \"Some Title\"");

        block_on(hook.persist_now(&message));

        let events = bus.drain();
        assert_eq!(events.len(), 1);
        match &events[0] {
            SessionEvent::PersistenceFailed { message_id, error } => {
                assert_eq!(message_id, &message.id);
                assert!(matches!(error, ChatError::PersistenceFailure(_)));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
