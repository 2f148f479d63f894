//! Conversation title generation via LLM.
//!
//! `generate_title` summarizes a transcript into a 2-3 word Title Case
//! title. The model output is post-processed deterministically, and any
//! failure falls back to a title derived from the first user message.

use tracing::{info, warn};
use uuid::Uuid;

use chatrelay_types::chat::{ChatMessage, DEFAULT_TITLE, MessageRole, truncate_with_ellipsis};
use chatrelay_types::error::ChatError;
use chatrelay_types::llm::{CompletionRequest, Message};

use crate::chat::prompt::PromptSet;
use crate::chat::repository::ChatRepository;
use crate::chat::service::ChatService;
use crate::llm::box_provider::BoxLlmProvider;

/// Maximum transcript length sent to the model.
pub const TRANSCRIPT_CHAR_CAP: usize = 8000;

/// Words kept from the model's answer.
const MAX_TITLE_WORDS: usize = 3;

/// Characters of the first user message kept by the fallback title.
const FALLBACK_TITLE_CHARS: usize = 30;

/// Render messages as `User: ..` / `Assistant: ..` lines, capped at
/// [`TRANSCRIPT_CHAR_CAP`] characters.
pub fn build_transcript(messages: &[ChatMessage]) -> String {
    let transcript = messages
        .iter()
        .filter_map(|m| match m.role {
            MessageRole::User => Some(format!("User: {}", m.content)),
            MessageRole::Assistant => Some(format!("Assistant: {}", m.content)),
            MessageRole::System => None,
        })
        .collect::<Vec<_>>()
        .join("\n");
    transcript.chars().take(TRANSCRIPT_CHAR_CAP).collect()
}

/// Normalize raw model output into a title.
///
/// Strips surrounding quotes, replaces every character that is neither
/// alphanumeric nor whitespace with a space, keeps at most three words, and
/// capitalizes each word. Returns `None` when nothing is left.
pub fn sanitize_title(raw: &str) -> Option<String> {
    let unquoted = raw
        .trim()
        .trim_matches(|c| matches!(c, '"' | '\'' | '`' | '“' | '”' | '‘' | '’'))
        .trim();
    let cleaned: String = unquoted
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();
    let words: Vec<String> = cleaned
        .split_whitespace()
        .take(MAX_TITLE_WORDS)
        .map(title_case_word)
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Title used when the model gives nothing usable.
pub fn fallback_title(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .find(|m| m.role == MessageRole::User && !m.content.trim().is_empty())
        .map(|m| truncate_with_ellipsis(m.content.trim(), FALLBACK_TITLE_CHARS))
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

/// Generate a title for a transcript. Never fails: model errors and empty
/// answers degrade to [`fallback_title`].
#[tracing::instrument(name = "generate_title", skip_all, fields(provider = %provider.name()))]
pub async fn generate_title(
    provider: &BoxLlmProvider,
    prompts: &PromptSet,
    messages: &[ChatMessage],
) -> String {
    let transcript = build_transcript(messages);
    if transcript.trim().is_empty() {
        return fallback_title(messages);
    }

    let mut request = CompletionRequest::text(
        prompts.title.clone(),
        vec![Message::user(transcript)],
        20,
    );
    request.temperature = Some(0.2);

    match provider.complete(&request).await {
        Ok(response) => match sanitize_title(&response.content) {
            Some(title) => title,
            None => {
                warn!("Title model returned nothing usable, using fallback");
                fallback_title(messages)
            }
        },
        Err(e) => {
            warn!(error = %e, "Title generation failed, using fallback");
            fallback_title(messages)
        }
    }
}

/// Generate and persist a new title for a conversation owned by `user_id`.
pub async fn retitle_conversation<C: ChatRepository>(
    service: &ChatService<C>,
    provider: &BoxLlmProvider,
    prompts: &PromptSet,
    conversation_id: &Uuid,
    user_id: &str,
) -> Result<String, ChatError> {
    let messages = service.messages(conversation_id, user_id).await?;
    let title = generate_title(provider, prompts, &messages).await;
    service
        .repo()
        .update_title(conversation_id, user_id, &title)
        .await?;
    info!(conversation_id = %conversation_id, title = %title, "Conversation title generated");
    Ok(title)
}
