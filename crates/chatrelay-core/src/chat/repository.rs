//! ChatRepository trait definition.
//!
//! Conversation and message persistence. Every conversation lookup is
//! scoped by the owning user id so a caller can never read or mutate
//! another user's conversation.

use chatrelay_types::chat::{ChatMessage, Conversation};
use chatrelay_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for conversation and message persistence.
///
/// Implementations live in chatrelay-infra (e.g., `SqliteChatRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ChatRepository: Send + Sync {
    /// Insert a new conversation.
    fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> impl std::future::Future<Output = Result<Conversation, RepositoryError>> + Send;

    /// Get a conversation by id, only if it is owned by `user_id`.
    fn get_conversation(
        &self,
        id: &Uuid,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Conversation>, RepositoryError>> + Send;

    /// List a user's conversations, most recently updated first.
    fn list_conversations(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Conversation>, RepositoryError>> + Send;

    /// Set a conversation's title. `NotFound` when the conversation does not
    /// exist or is not owned by `user_id`.
    fn update_title(
        &self,
        id: &Uuid,
        user_id: &str,
        title: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a conversation and all of its messages.
    fn delete_conversation(
        &self,
        id: &Uuid,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Append a message and bump the conversation's `updated_at`.
    fn save_message(
        &self,
        message: &ChatMessage,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// All messages of a conversation, ordered by `(created_at, id)` ascending.
    fn get_messages(
        &self,
        conversation_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// The newest `limit` messages of a conversation, returned oldest-first.
    fn get_recent_messages(
        &self,
        conversation_id: &Uuid,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;
}
