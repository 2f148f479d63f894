//! Prompt templates used by chat turns, research, and title generation.
//!
//! A `PromptSet` is built once at startup (defaults, optionally overridden
//! from config) and shared read-only afterwards.

/// Default system prompt for chat turns.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful, knowledgeable assistant. \
Answer clearly and accurately. Use Markdown for structure when it helps: short \
paragraphs, lists, and fenced code blocks with a language tag. If you are not \
sure about something, say so instead of guessing.";

/// Default prompt for planning web searches.
pub const DEFAULT_PLANNER_PROMPT: &str = r#"You plan web searches that will help answer the user's message.
Return ONLY JSON in this exact shape, with no commentary:
{"queries":[{"query":"...","type":"...","reason":"..."}]}

Rules:
- Between 3 and 6 queries.
- Each query is a concise search-engine query, not a question to the user.
- Cover distinct angles (definitions, recent developments, data, expert sources).
- "type" is a one-word category such as "overview", "news", "data", or "howto".
- "reason" is a short phrase explaining what the query is for."#;

/// Default prompt for rewriting a message into a single search query.
pub const DEFAULT_REWRITE_PROMPT: &str = "Rewrite the user's message as one concise, \
effective web search query. Return ONLY the query text on a single line, without \
quotes or explanation.";

/// Default prompt for summarizing research results.
pub const DEFAULT_SUMMARY_PROMPT: &str = "Summarize the search results below as 3 to 6 \
short, neutral bullet points, each starting with \"- \". State facts only. Do not \
include links, URLs, source numbers, or citations.";

/// Default prompt for conversation titles.
pub const DEFAULT_TITLE_PROMPT: &str = "Write a title of 2 or 3 words in Title Case for \
the conversation below. Return ONLY the title. No punctuation, no quotes, no emojis.";

/// Immutable set of prompt templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    pub system: String,
    pub planner: String,
    pub rewrite: String,
    pub summary: String,
    pub title: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            system: DEFAULT_SYSTEM_PROMPT.to_string(),
            planner: DEFAULT_PLANNER_PROMPT.to_string(),
            rewrite: DEFAULT_REWRITE_PROMPT.to_string(),
            summary: DEFAULT_SUMMARY_PROMPT.to_string(),
            title: DEFAULT_TITLE_PROMPT.to_string(),
        }
    }
}

impl PromptSet {
    /// System prompt for a chat turn, with the research brief appended when
    /// web research produced one.
    pub fn chat_system(&self, brief: Option<&str>) -> String {
        match brief {
            Some(brief) if !brief.trim().is_empty() => {
                format!("{}\n\n<web_research>\n{}\n</web_research>", self.system, brief.trim())
            }
            _ => self.system.clone(),
        }
    }
}
