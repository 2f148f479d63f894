//! Conversation, message, and stream event types for chatrelay.
//!
//! Conversations belong to a single owner (`user_id`). Messages are
//! append-only and ordered by `(created_at, id)` within a conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::llm::ProviderKind;
use crate::research::SourceCitation;

// Re-export MessageRole from llm module (it's used in both chat and llm contexts).
pub use crate::llm::MessageRole;

/// Title used when there is nothing to derive one from.
pub const DEFAULT_TITLE: &str = "New Chat";

/// A conversation owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Web research artifacts attached to an assistant message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchArtifacts {
    pub sources: Vec<SourceCitation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brief: Option<String>,
}

impl ResearchArtifacts {
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.summary.is_none() && self.brief.is_none()
    }
}

/// A single message within a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub user_id: String,
    pub role: MessageRole,
    pub content: String,
    /// Research artifacts (assistant messages produced with web search only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub research: Option<ResearchArtifacts>,
    /// Set when the assistant stream failed after producing some text.
    #[serde(default)]
    pub truncated: bool,
    /// Backend that produced this message (assistant messages only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,
    /// Model that produced this message (assistant messages only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Character length used by the history window.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// Events relayed to the client over the chat stream.
///
/// The serialized `type` tag doubles as the SSE event name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TurnEvent {
    /// Citations gathered by web research (emitted at most once).
    Sources { sources: Vec<SourceCitation> },
    /// Bullet summary of the research (emitted at most once).
    WebSummary { summary: String },
    /// One incremental chunk of assistant text.
    Delta { delta: String },
    /// Terminal success event.
    #[serde(rename_all = "camelCase")]
    Done { conversation_id: Uuid },
    /// Terminal failure event.
    Error { message: String },
}

impl TurnEvent {
    /// SSE event name for this event.
    pub fn name(&self) -> &'static str {
        match self {
            TurnEvent::Sources { .. } => "sources",
            TurnEvent::WebSummary { .. } => "webSummary",
            TurnEvent::Delta { .. } => "delta",
            TurnEvent::Done { .. } => "done",
            TurnEvent::Error { .. } => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnEvent::Done { .. } | TurnEvent::Error { .. })
    }
}

/// Truncate to `max_chars` characters, appending an ellipsis when cut.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}…")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_event_tags_match_names() {
        let events = [
            TurnEvent::Sources { sources: vec![] },
            TurnEvent::WebSummary {
                summary: "- a".to_string(),
            },
            TurnEvent::Delta {
                delta: "hi".to_string(),
            },
            TurnEvent::Done {
                conversation_id: Uuid::now_v7(),
            },
            TurnEvent::Error {
                message: "boom".to_string(),
            },
        ];
        for event in events {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["type"], event.name());
        }
    }

    #[test]
    fn test_done_event_uses_camel_case_id() {
        let id = Uuid::now_v7();
        let json = serde_json::to_value(TurnEvent::Done { conversation_id: id }).unwrap();
        assert_eq!(json["conversationId"], id.to_string());
    }

    #[test]
    fn test_terminal_events() {
        assert!(TurnEvent::Error { message: String::new() }.is_terminal());
        assert!(!TurnEvent::Delta { delta: String::new() }.is_terminal());
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("Hello", 60), "Hello");
        assert_eq!(truncate_with_ellipsis("abcdef", 3), "abc…");
        // Counts characters, not bytes.
        assert_eq!(truncate_with_ellipsis("ééé", 3), "ééé");
    }

    #[test]
    fn test_message_role_reexport() {
        let role = MessageRole::User;
        assert_eq!(role.to_string(), "user");
    }
}
