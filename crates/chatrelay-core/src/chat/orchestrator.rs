//! Streaming chat turn orchestration.
//!
//! A turn runs: validate -> ensure conversation -> persist user message ->
//! select provider -> (optional) web research -> history window -> start
//! stream -> relay deltas -> persist assistant message -> done.
//!
//! Everything up to and including the first provider stream item happens in
//! [`ChatOrchestrator::start_turn`], so client errors and early upstream
//! failures surface as plain errors before any event is sent. After that,
//! failures are reported in-band as a single terminal `error` event.

use std::pin::Pin;
use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use uuid::Uuid;

use chatrelay_types::chat::TurnEvent;
use chatrelay_types::error::{ChatError, RepositoryError};
use chatrelay_types::llm::{
    CompletionRequest, LlmError, Message, ProviderKind, RequestExtensions, StreamEvent,
};

use crate::chat::prompt::PromptSet;
use crate::chat::repository::ChatRepository;
use crate::chat::service::{AssistantReply, ChatService};
use crate::chat::title;
use crate::chat::window::{HistoryWindow, to_llm_messages};
use crate::llm::registry::{ProviderRegistry, SelectedProvider};
use crate::research::WebResearcher;

/// Stream of events for one chat turn.
pub type TurnStream = Pin<Box<dyn Stream<Item = TurnEvent> + Send + 'static>>;

/// An inbound chat turn.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub user_id: String,
    pub conversation_id: Option<Uuid>,
    pub message: String,
    pub web_search: bool,
    pub provider: Option<ProviderKind>,
}

/// A turn whose provider stream has started.
pub struct ActiveTurn {
    pub conversation_id: Uuid,
    pub events: TurnStream,
}

impl std::fmt::Debug for ActiveTurn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveTurn")
            .field("conversation_id", &self.conversation_id)
            .field("events", &"<stream>")
            .finish()
    }
}

/// Generation parameters for chat turns.
#[derive(Debug, Clone, Copy)]
pub struct TurnSettings {
    pub window: HistoryWindow,
    pub max_tokens: u32,
    pub temperature: Option<f64>,
}

impl Default for TurnSettings {
    fn default() -> Self {
        Self {
            window: HistoryWindow::default(),
            max_tokens: 4096,
            temperature: None,
        }
    }
}

/// Ties together provider selection, research, history, streaming, and
/// persistence for chat turns.
pub struct ChatOrchestrator<C: ChatRepository> {
    chat: Arc<ChatService<C>>,
    registry: ProviderRegistry,
    researcher: Option<WebResearcher>,
    prompts: Arc<PromptSet>,
    settings: TurnSettings,
}

/// Stable per-conversation end-user tag forwarded to gateway providers.
pub fn provider_user_tag(user_id: &str, conversation_id: &Uuid) -> String {
    let digest = Sha256::digest(format!("{user_id}:{conversation_id}").as_bytes());
    format!("{:x}", digest)
}

impl<C: ChatRepository + 'static> ChatOrchestrator<C> {
    pub fn new(
        chat: Arc<ChatService<C>>,
        registry: ProviderRegistry,
        researcher: Option<WebResearcher>,
        prompts: Arc<PromptSet>,
        settings: TurnSettings,
    ) -> Self {
        Self {
            chat,
            registry,
            researcher,
            prompts,
            settings,
        }
    }

    pub fn chat(&self) -> &ChatService<C> {
        &self.chat
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Whether web research can run at all (a search backend is configured).
    pub fn research_enabled(&self) -> bool {
        self.researcher.is_some()
    }

    fn select(&self, requested: Option<ProviderKind>) -> Result<SelectedProvider, ChatError> {
        self.registry.resolve(requested).map_err(|e| match e {
            LlmError::NotConfigured(kind) => {
                ChatError::InvalidRequest(format!("provider '{kind}' is not configured"))
            }
            other => ChatError::Upstream(other),
        })
    }

    /// Start a chat turn and return its event stream.
    ///
    /// Returns an error (and emits no events) for invalid input, a missing
    /// or foreign conversation, or a provider failure before the first
    /// stream item.
    #[tracing::instrument(
        name = "chat_turn",
        skip(self, request),
        fields(user_id = %request.user_id, web_search = request.web_search)
    )]
    pub async fn start_turn(&self, request: TurnRequest) -> Result<ActiveTurn, ChatError> {
        let message = request.message.trim();
        if message.is_empty() {
            return Err(ChatError::InvalidRequest("message must not be empty".to_string()));
        }
        let selected = self.select(request.provider)?;

        let conversation = self
            .chat
            .ensure_conversation(request.conversation_id, &request.user_id, message)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ChatError::ConversationNotFound,
                other => ChatError::Repository(other),
            })?;
        self.chat
            .save_user_message(&conversation, &request.message)
            .await?;

        let research = match (&self.researcher, request.web_search) {
            (Some(researcher), true) => Some(
                researcher
                    .research(&selected.provider, &self.prompts, message)
                    .await,
            ),
            (None, true) => {
                debug!("Web search requested but no search backend is configured");
                None
            }
            _ => None,
        };

        let history = self
            .chat
            .recent_messages(&conversation.id, self.settings.window.turn_cap)
            .await?;
        let window = self.settings.window.apply(&history);
        let mut messages = to_llm_messages(window);
        if messages.is_empty() {
            messages.push(Message::user(request.message.clone()));
        }
        debug!(
            stored = history.len(),
            windowed = messages.len(),
            "History window applied"
        );

        let completion = CompletionRequest {
            model: String::new(),
            messages,
            system: Some(
                self.prompts
                    .chat_system(research.as_ref().and_then(|r| r.brief.as_deref())),
            ),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            stream: true,
            extensions: selected.kind.accepts_extensions().then(|| RequestExtensions {
                user: Some(provider_user_tag(&request.user_id, &conversation.id)),
                transforms: vec!["middle-out".to_string()],
            }),
        };

        let mut upstream = selected.provider.stream(completion);
        let first = match upstream.next().await {
            Some(Err(e)) => {
                warn!(provider = %selected.kind, error = %e, "Provider failed before streaming");
                return Err(ChatError::Upstream(e));
            }
            other => other,
        };
        info!(
            conversation_id = %conversation.id,
            provider = %selected.kind,
            "Chat stream started"
        );

        let chat = Arc::clone(&self.chat);
        let provider_kind = selected.kind;
        let model = selected.provider.default_model().to_string();
        let conversation_id = conversation.id;

        let events = async_stream::stream! {
            let research = research.unwrap_or_default();
            if !research.sources.is_empty() {
                yield TurnEvent::Sources { sources: research.sources.clone() };
            }
            if let Some(summary) = &research.summary {
                yield TurnEvent::WebSummary { summary: summary.clone() };
            }

            let mut text = String::new();
            let mut failure: Option<LlmError> = None;
            let mut pending = first;
            loop {
                let item = match pending.take() {
                    Some(item) => item,
                    None => match upstream.next().await {
                        Some(item) => item,
                        None => break,
                    },
                };
                match item {
                    Ok(StreamEvent::TextDelta { text: delta }) => {
                        if delta.is_empty() {
                            continue;
                        }
                        text.push_str(&delta);
                        yield TurnEvent::Delta { delta };
                    }
                    Ok(StreamEvent::Done) => break,
                    Ok(_) => {}
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }

            if !text.is_empty() {
                let reply = AssistantReply {
                    content: text,
                    research: (!research.is_empty()).then_some(research),
                    truncated: failure.is_some(),
                    provider: provider_kind,
                    model,
                };
                if let Err(e) = chat.save_assistant_message(&conversation, reply).await {
                    warn!(conversation_id = %conversation_id, error = %e, "Failed to persist assistant message");
                    if failure.is_none() {
                        yield TurnEvent::Error { message: "failed to save the assistant reply".to_string() };
                        return;
                    }
                }
            }

            match failure {
                Some(e) => {
                    warn!(conversation_id = %conversation_id, error = %e, "Provider stream failed mid-turn");
                    yield TurnEvent::Error { message: e.to_string() };
                }
                None => {
                    info!(conversation_id = %conversation_id, "Chat turn completed");
                    yield TurnEvent::Done { conversation_id };
                }
            }
        };

        Ok(ActiveTurn {
            conversation_id,
            events: Box::pin(events),
        })
    }

    /// Generate and persist a title for a conversation owned by `user_id`.
    pub async fn generate_title(
        &self,
        conversation_id: &Uuid,
        user_id: &str,
        provider: Option<ProviderKind>,
    ) -> Result<String, ChatError> {
        let selected = self.select(provider)?;
        title::retitle_conversation(
            &self.chat,
            &selected.provider,
            &self.prompts,
            conversation_id,
            user_id,
        )
        .await
        .map_err(|e| match e {
            ChatError::Repository(RepositoryError::NotFound) => ChatError::ConversationNotFound,
            other => other,
        })
    }
}
