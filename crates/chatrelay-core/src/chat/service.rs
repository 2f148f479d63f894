//! Chat service coordinating conversation lifecycle and message persistence.
//!
//! ChatService wraps a `ChatRepository` with the domain rules the HTTP layer
//! and the orchestrator share: owner-scoped lookups, initial titles derived
//! from the first message, and message construction.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use chatrelay_types::chat::{
    ChatMessage, Conversation, DEFAULT_TITLE, MessageRole, ResearchArtifacts,
    truncate_with_ellipsis,
};
use chatrelay_types::error::RepositoryError;
use chatrelay_types::llm::ProviderKind;

use crate::chat::repository::ChatRepository;

/// Characters of the first message kept in an initial conversation title.
pub const INITIAL_TITLE_CHARS: usize = 60;

/// Longest title accepted by a rename.
pub const MAX_TITLE_CHARS: usize = 200;

/// Provenance and content of an assistant reply to be persisted.
#[derive(Debug, Clone)]
pub struct AssistantReply {
    pub content: String,
    pub research: Option<ResearchArtifacts>,
    pub truncated: bool,
    pub provider: ProviderKind,
    pub model: String,
}

/// Orchestrates conversation lifecycle and message persistence.
///
/// Generic over `ChatRepository` so chatrelay-core never depends on
/// chatrelay-infra.
pub struct ChatService<C: ChatRepository> {
    repo: C,
}

impl<C: ChatRepository> ChatService<C> {
    pub fn new(repo: C) -> Self {
        Self { repo }
    }

    /// Access the underlying repository.
    pub fn repo(&self) -> &C {
        &self.repo
    }

    // --- Conversations ---

    /// Resolve the conversation for a chat turn.
    ///
    /// With an id, the conversation must exist and be owned by `user_id`
    /// (`NotFound` otherwise). Without one, a new conversation is created
    /// and titled from the first message.
    #[tracing::instrument(skip(self, first_message), fields(user_id = %user_id))]
    pub async fn ensure_conversation(
        &self,
        conversation_id: Option<Uuid>,
        user_id: &str,
        first_message: &str,
    ) -> Result<Conversation, RepositoryError> {
        if let Some(id) = conversation_id {
            return self
                .repo
                .get_conversation(&id, user_id)
                .await?
                .ok_or(RepositoryError::NotFound);
        }

        let now = Utc::now();
        let conversation = Conversation {
            id: Uuid::now_v7(),
            user_id: user_id.to_string(),
            title: initial_title(first_message),
            created_at: now,
            updated_at: now,
        };
        let created = self.repo.create_conversation(&conversation).await?;
        info!(conversation_id = %created.id, "Conversation created");
        Ok(created)
    }

    /// Get a conversation owned by `user_id`.
    pub async fn get_conversation(
        &self,
        id: &Uuid,
        user_id: &str,
    ) -> Result<Conversation, RepositoryError> {
        self.repo
            .get_conversation(id, user_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// List a user's conversations, newest first.
    pub async fn list_conversations(
        &self,
        user_id: &str,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        self.repo.list_conversations(user_id).await
    }

    /// Rename a conversation.
    pub async fn rename(
        &self,
        id: &Uuid,
        user_id: &str,
        title: &str,
    ) -> Result<Conversation, RepositoryError> {
        let title = title.trim();
        self.repo.update_title(id, user_id, title).await?;
        info!(conversation_id = %id, "Conversation renamed");
        self.get_conversation(id, user_id).await
    }

    /// Delete a conversation with all of its messages.
    pub async fn delete(&self, id: &Uuid, user_id: &str) -> Result<(), RepositoryError> {
        self.repo.delete_conversation(id, user_id).await?;
        info!(conversation_id = %id, "Conversation deleted");
        Ok(())
    }

    /// Messages of a conversation owned by `user_id`, oldest first.
    pub async fn messages(
        &self,
        id: &Uuid,
        user_id: &str,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        self.get_conversation(id, user_id).await?;
        self.repo.get_messages(id).await
    }

    /// The newest `limit` messages of a conversation, oldest first.
    pub async fn recent_messages(
        &self,
        conversation_id: &Uuid,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        self.repo.get_recent_messages(conversation_id, limit).await
    }

    // --- Message persistence ---

    /// Persist the user's message for a turn.
    pub async fn save_user_message(
        &self,
        conversation: &Conversation,
        content: &str,
    ) -> Result<ChatMessage, RepositoryError> {
        let message = ChatMessage {
            id: Uuid::now_v7(),
            conversation_id: conversation.id,
            user_id: conversation.user_id.clone(),
            role: MessageRole::User,
            content: content.to_string(),
            research: None,
            truncated: false,
            provider: None,
            model: None,
            created_at: Utc::now(),
        };
        self.repo.save_message(&message).await?;
        debug!(message_id = %message.id, "User message saved");
        Ok(message)
    }

    /// Persist an assistant reply.
    pub async fn save_assistant_message(
        &self,
        conversation: &Conversation,
        reply: AssistantReply,
    ) -> Result<ChatMessage, RepositoryError> {
        let message = ChatMessage {
            id: Uuid::now_v7(),
            conversation_id: conversation.id,
            user_id: conversation.user_id.clone(),
            role: MessageRole::Assistant,
            content: reply.content,
            research: reply.research.filter(|r| !r.is_empty()),
            truncated: reply.truncated,
            provider: Some(reply.provider),
            model: Some(reply.model),
            created_at: Utc::now(),
        };
        self.repo.save_message(&message).await?;
        debug!(
            message_id = %message.id,
            chars = message.char_len(),
            truncated = message.truncated,
            "Assistant message saved"
        );
        Ok(message)
    }
}

/// Title for a conversation created from its first message.
pub fn initial_title(first_message: &str) -> String {
    let trimmed = first_message.trim();
    if trimmed.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        truncate_with_ellipsis(trimmed, INITIAL_TITLE_CHARS)
    }
}
