//! History windowing.
//!
//! Selects the suffix of a conversation that fits a character budget so the
//! provider sees the most recent context without exceeding its window.

use chatrelay_types::chat::ChatMessage;
use chatrelay_types::llm::{Message, MessageRole};

/// Character budget and turn cap for the history sent to a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryWindow {
    pub char_budget: usize,
    pub turn_cap: usize,
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self {
            char_budget: 16_000,
            turn_cap: 100,
        }
    }
}

impl HistoryWindow {
    pub fn new(char_budget: usize, turn_cap: usize) -> Self {
        Self {
            char_budget,
            turn_cap,
        }
    }

    /// Trim `history` (oldest-first) to the window.
    ///
    /// Considers only the newest `turn_cap` messages, then walks backward
    /// from the newest, stopping at the first message that would push the
    /// running character total past the budget. The result is a
    /// contiguous suffix in chronological order; it is empty when the
    /// newest message alone exceeds the budget.
    pub fn apply<'a>(&self, history: &'a [ChatMessage]) -> &'a [ChatMessage] {
        let capped = &history[history.len().saturating_sub(self.turn_cap)..];

        let mut total = 0usize;
        let mut start = capped.len();
        for (idx, message) in capped.iter().enumerate().rev() {
            let len = message.char_len();
            if total + len > self.char_budget {
                break;
            }
            total += len;
            start = idx;
        }
        &capped[start..]
    }
}

/// Convert stored messages into provider messages.
pub fn to_llm_messages(history: &[ChatMessage]) -> Vec<Message> {
    history
        .iter()
        .filter(|m| m.role != MessageRole::System)
        .map(|m| Message {
            role: m.role,
            content: m.content.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn msg(role: MessageRole, content: &str) -> ChatMessage {
        ChatMessage {
            id: Uuid::now_v7(),
            conversation_id: Uuid::nil(),
            user_id: "u".to_string(),
            role,
            content: content.to_string(),
            research: None,
            truncated: false,
            provider: None,
            model: None,
            created_at: Utc::now(),
        }
    }

    fn contents(window: &[ChatMessage]) -> Vec<&str> {
        window.iter().map(|m| m.content.as_str()).collect()
    }

    #[test]
    fn test_everything_fits() {
        let history = vec![
            msg(MessageRole::User, "hi"),
            msg(MessageRole::Assistant, "hello"),
            msg(MessageRole::User, "how are you"),
        ];
        let window = HistoryWindow::new(1000, 100).apply(&history);
        assert_eq!(contents(window), vec!["hi", "hello", "how are you"]);
    }

    #[test]
    fn test_budget_keeps_newest_suffix() {
        let history = vec![
            msg(MessageRole::User, "aaaaaaaaaa"),
            msg(MessageRole::Assistant, "bbbbb"),
            msg(MessageRole::User, "ccccc"),
        ];
        let window = HistoryWindow::new(12, 100).apply(&history);
        assert_eq!(contents(window), vec!["bbbbb", "ccccc"]);
    }

    #[test]
    fn test_stops_at_first_overflow() {
        // The oldest message would fit on its own, but the walk stops at the
        // first message that overflows, keeping the window contiguous.
        let history = vec![
            msg(MessageRole::User, "a"),
            msg(MessageRole::Assistant, "bbbbbbbbbb"),
            msg(MessageRole::User, "cc"),
        ];
        let window = HistoryWindow::new(5, 100).apply(&history);
        assert_eq!(contents(window), vec!["cc"]);
    }

    #[test]
    fn test_newest_over_budget_yields_empty() {
        let history = vec![msg(MessageRole::User, "hi"), msg(MessageRole::User, "way too long")];
        assert!(HistoryWindow::new(4, 100).apply(&history).is_empty());
    }

    #[test]
    fn test_turn_cap() {
        let history: Vec<_> = (0..10)
            .map(|i| msg(MessageRole::User, &i.to_string()))
            .collect();
        let window = HistoryWindow::new(1000, 3).apply(&history);
        assert_eq!(contents(window), vec!["7", "8", "9"]);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let history = vec![msg(MessageRole::User, "日本語")];
        assert_eq!(HistoryWindow::new(3, 100).apply(&history).len(), 1);
    }

    #[test]
    fn test_window_within_budget_property() {
        let history: Vec<_> = (1..40)
            .map(|i| msg(MessageRole::User, &"x".repeat(i * 7 % 23 + 1)))
            .collect();
        for budget in [0, 1, 10, 50, 200, 10_000] {
            let window = HistoryWindow::new(budget, 100).apply(&history);
            let total: usize = window.iter().map(|m| m.char_len()).sum();
            assert!(total <= budget);
            if !window.is_empty() {
                // Suffix of the input.
                let offset = history.len() - window.len();
                assert_eq!(window[0].id, history[offset].id);
            }
        }
    }

    #[test]
    fn test_empty_history() {
        assert!(HistoryWindow::default().apply(&[]).is_empty());
    }

    #[test]
    fn test_to_llm_messages_preserves_roles() {
        let history = vec![msg(MessageRole::User, "q"), msg(MessageRole::Assistant, "a")];
        let messages = to_llm_messages(&history);
        assert_eq!(messages[0], Message::user("q"));
        assert_eq!(messages[1], Message::assistant("a"));
    }
}
