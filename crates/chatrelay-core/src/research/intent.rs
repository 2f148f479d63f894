//! News-intent detection for choosing the search vertical.

use std::sync::LazyLock;

use regex::Regex;

use chatrelay_types::research::SearchMode;

/// Messages asking about current events go to the news vertical.
static NEWS_INTENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(news|latest|today|this week|breaking|headline|update|updates)\b")
        .expect("news intent regex")
});

/// Pick the search vertical for a user message.
pub fn detect_mode(message: &str) -> SearchMode {
    if NEWS_INTENT_RE.is_match(message) {
        SearchMode::News
    } else {
        SearchMode::Web
    }
}
