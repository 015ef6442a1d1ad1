//! Chat gateway - one provider exchange per call

use chat_relay_core::config::ChatDefaults;
use chat_relay_core::models::ModelCatalog;
use chat_relay_core::session::{ChatTurn, SessionStore};
use chat_relay_providers::{ChatProvider, GenerationRequest};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::ChatError;

/// Result of a successful exchange
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// The assistant turn that was recorded
    pub assistant: ChatTurn,
    /// Model actually used, after substitution
    pub model: String,
}

/// Translates chat messages into provider calls and records the transcript.
pub struct ChatGateway {
    provider: Arc<dyn ChatProvider>,
    catalog: ModelCatalog,
    sessions: SessionStore,
    defaults: ChatDefaults,
}

impl ChatGateway {
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        catalog: ModelCatalog,
        sessions: SessionStore,
        defaults: ChatDefaults,
    ) -> Self {
        Self {
            provider,
            catalog,
            sessions,
            defaults,
        }
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn provider_display_name(&self) -> &str {
        self.provider.display_name()
    }

    /// Run one exchange for `session`.
    ///
    /// The session is only touched once the provider reply has been fully
    /// extracted; both turns are then appended together.
    pub async fn send(
        &self,
        session: &str,
        message: Option<&str>,
        model: Option<&str>,
        temperature: Option<f64>,
        max_tokens: Option<u32>,
    ) -> Result<ChatOutcome, ChatError> {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| ChatError::Validation("Message is required".to_string()))?;

        let resolved = self.catalog.resolve(model);
        if let Some(requested) = model {
            if requested != resolved {
                warn!(
                    requested,
                    substituted = resolved,
                    "Unsupported model requested, using default"
                );
            }
        }

        let request = GenerationRequest::new(resolved, message)
            .with_temperature(temperature.unwrap_or(self.defaults.temperature))
            .with_max_tokens(max_tokens.unwrap_or(self.defaults.max_tokens));

        debug!(session, model = resolved, "Forwarding chat message to provider");

        let generation = self
            .provider
            .generate(request)
            .await
            .map_err(|e| {
                warn!(
                    session,
                    model = resolved,
                    transport = e.is_transport(),
                    "Provider call failed: {}",
                    e
                );
                ChatError::from_provider(e, self.provider.name())
            })?;

        let user_turn = ChatTurn::user(message);
        let assistant_turn = ChatTurn::assistant(generation.text);
        self.sessions
            .append_exchange(session, user_turn, assistant_turn.clone());

        info!(
            session,
            model = resolved,
            finish_reason = generation.finish_reason.as_deref().unwrap_or("unknown"),
            total_tokens = generation.usage.as_ref().map_or(0, |u| u.total_tokens),
            "Chat exchange completed"
        );

        Ok(ChatOutcome {
            assistant: assistant_turn,
            model: resolved.to_string(),
        })
    }

    /// Drop a session's history
    pub fn clear(&self, session: &str) {
        self.sessions.clear(session);
        info!(session, "Chat history cleared");
    }

    /// The session's turns, oldest first
    pub fn history(&self, session: &str) -> Vec<ChatTurn> {
        self.sessions.get(session)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use chat_relay_core::config::GeminiConfig;
    use chat_relay_core::session::Role;
    use chat_relay_providers::{GeminiClient, Generation, ProviderError, ProviderResult};
    use std::sync::Mutex;

    /// Canned provider that records every request it receives
    pub(crate) struct FakeProvider {
        reply: Box<dyn Fn() -> ProviderResult<Generation> + Send + Sync>,
        pub(crate) requests: Mutex<Vec<GenerationRequest>>,
    }

    impl FakeProvider {
        pub(crate) fn replying(text: &'static str) -> Self {
            Self::with(move || Ok(Generation::new(text)))
        }

        pub(crate) fn with(
            reply: impl Fn() -> ProviderResult<Generation> + Send + Sync + 'static,
        ) -> Self {
            Self {
                reply: Box::new(reply),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChatProvider for FakeProvider {
        async fn generate(&self, request: GenerationRequest) -> ProviderResult<Generation> {
            self.requests.lock().unwrap().push(request);
            (self.reply)()
        }

        fn name(&self) -> &str {
            "Gemini"
        }

        fn display_name(&self) -> &str {
            "Google Gemini"
        }
    }

    fn gateway(provider: Arc<FakeProvider>) -> ChatGateway {
        ChatGateway::new(
            provider,
            ModelCatalog::default(),
            SessionStore::new(),
            ChatDefaults::default(),
        )
    }

    #[tokio::test]
    async fn test_success_appends_user_then_assistant() {
        let provider = Arc::new(FakeProvider::replying("Hello back"));
        let gateway = gateway(provider.clone());

        let outcome = gateway
            .send("s1", Some("Hello"), None, None, None)
            .await
            .unwrap();

        assert_eq!(outcome.assistant.content(), "Hello back");
        assert_eq!(outcome.assistant.role(), Role::Assistant);
        assert_eq!(outcome.model, "gemini-1.5-flash");

        let history = gateway.history("s1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role(), Role::User);
        assert_eq!(history[0].content(), "Hello");
        assert_eq!(history[1], outcome.assistant);
    }

    #[tokio::test]
    async fn test_defaults_fill_generation_parameters() {
        let provider = Arc::new(FakeProvider::replying("ok"));
        let gateway = gateway(provider.clone());

        gateway
            .send("s1", Some("hi"), Some("gemini-pro"), Some(0.1), Some(32))
            .await
            .unwrap();
        gateway.send("s1", Some("hi"), None, None, None).await.unwrap();

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests[0].model, "gemini-pro");
        assert_eq!(requests[0].max_tokens, 32);
        assert!((requests[0].temperature - 0.1).abs() < f64::EPSILON);
        assert_eq!(requests[1].max_tokens, 1000);
        assert!((requests[1].temperature - 0.7).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_missing_or_blank_message_never_calls_provider() {
        let provider = Arc::new(FakeProvider::replying("unused"));
        let gateway = gateway(provider.clone());

        for message in [None, Some(""), Some("   \n")] {
            let err = gateway.send("s1", message, None, None, None).await.unwrap_err();
            assert!(matches!(err, ChatError::Validation(_)));
        }

        assert_eq!(provider.calls(), 0);
        assert!(gateway.history("s1").is_empty());
    }

    #[tokio::test]
    async fn test_unknown_model_is_substituted() {
        let provider = Arc::new(FakeProvider::replying("ok"));
        let gateway = gateway(provider.clone());

        let outcome = gateway
            .send("s1", Some("hi"), Some("gpt-4o"), None, None)
            .await
            .unwrap();

        assert_eq!(outcome.model, "gemini-1.5-flash");
        assert_eq!(provider.requests.lock().unwrap()[0].model, "gemini-1.5-flash");
    }

    #[tokio::test]
    async fn test_schema_failure_leaves_history_untouched() {
        let provider = Arc::new(FakeProvider::with(|| {
            Err(ProviderError::InvalidResponse("No candidates in response".to_string()))
        }));
        let gateway = gateway(provider.clone());
        gateway
            .sessions()
            .append_exchange("s1", ChatTurn::user("a"), ChatTurn::assistant("b"));

        let err = gateway.send("s1", Some("hi"), None, None, None).await.unwrap_err();

        assert!(matches!(err, ChatError::Schema { .. }));
        assert_eq!(gateway.history("s1").len(), 2);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_carries_status_and_body() {
        let provider = Arc::new(FakeProvider::with(|| {
            Err(ProviderError::ApiError {
                status: 503,
                body: "overloaded".to_string(),
            })
        }));
        let gateway = gateway(provider);

        let err = gateway.send("s1", Some("hi"), None, None, None).await.unwrap_err();

        match err {
            ChatError::Transport {
                status, details, ..
            } => {
                assert_eq!(status, Some(503));
                assert_eq!(details.as_deref(), Some("overloaded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(gateway.history("s1").is_empty());
    }

    #[tokio::test]
    async fn test_provider_timeout_is_transport_failure() {
        // Accepts connections and never writes a byte back
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let config = GeminiConfig {
            api_key: "test-key".to_string(),
            api_base: format!("http://{}", addr),
            timeout_secs: 1,
            ..Default::default()
        };
        let gateway = ChatGateway::new(
            Arc::new(GeminiClient::new(&config).unwrap()),
            ModelCatalog::from_config(&config),
            SessionStore::new(),
            ChatDefaults::default(),
        );

        let err = gateway.send("s1", Some("hi"), None, None, None).await.unwrap_err();

        match &err {
            ChatError::Transport {
                message,
                status,
                details,
            } => {
                assert_eq!(*status, None);
                assert!(details.is_none());
                assert!(message.contains("did not answer in time"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(gateway.sessions().len("s1"), 0);
    }

    #[tokio::test]
    async fn test_clear_twice_is_same_as_once() {
        let provider = Arc::new(FakeProvider::replying("ok"));
        let gateway = gateway(provider);
        gateway.send("s1", Some("hi"), None, None, None).await.unwrap();

        gateway.clear("s1");
        assert!(gateway.history("s1").is_empty());
        gateway.clear("s1");
        assert!(gateway.history("s1").is_empty());
    }
}
