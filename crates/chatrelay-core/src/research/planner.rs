//! Search query planning.
//!
//! The model is asked for a JSON plan; its answer is treated as untrusted
//! input and decoded into typed entries. Failures fall back to a single
//! rewritten query, and finally to the user's message itself.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::{debug, warn};

use chatrelay_types::llm::{CompletionRequest, Message};
use chatrelay_types::research::SearchPlanEntry;

use crate::chat::prompt::PromptSet;
use crate::llm::box_provider::BoxLlmProvider;

/// Longest single search query.
pub const MAX_QUERY_CHARS: usize = 300;

/// Why a planner answer could not be used.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PlanDecodeError {
    #[error("planner output is not valid JSON: {0}")]
    Json(String),

    #[error("planner output contains no usable queries")]
    Empty,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPlan {
    Wrapped { queries: Vec<RawEntry> },
    Bare(Vec<RawEntry>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Full(SearchPlanEntry),
    Query(String),
}

impl From<RawEntry> for SearchPlanEntry {
    fn from(raw: RawEntry) -> Self {
        match raw {
            RawEntry::Full(entry) => entry,
            RawEntry::Query(query) => SearchPlanEntry::new(query),
        }
    }
}

/// Remove a surrounding Markdown code fence, if any.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening fence line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().trim_end_matches("```").trim()
}

/// Decode a planner answer into at most `max_queries` unique entries.
///
/// Accepts `{"queries":[..]}` or a bare array, optionally inside a code
/// fence. Entries may be objects or plain strings. Blank queries are
/// dropped and duplicates are removed case-insensitively.
pub fn decode_plan(raw: &str, max_queries: usize) -> Result<Vec<SearchPlanEntry>, PlanDecodeError> {
    let body = strip_code_fence(raw);
    let plan: RawPlan =
        serde_json::from_str(body).map_err(|e| PlanDecodeError::Json(e.to_string()))?;
    let entries = match plan {
        RawPlan::Wrapped { queries } => queries,
        RawPlan::Bare(entries) => entries,
    };

    let mut seen = HashSet::new();
    let plan: Vec<SearchPlanEntry> = entries
        .into_iter()
        .map(SearchPlanEntry::from)
        .filter_map(|mut entry| {
            let query: String = entry.query.trim().chars().take(MAX_QUERY_CHARS).collect();
            if query.is_empty() || !seen.insert(query.to_lowercase()) {
                return None;
            }
            entry.query = query;
            Some(entry)
        })
        .take(max_queries)
        .collect();

    if plan.is_empty() {
        Err(PlanDecodeError::Empty)
    } else {
        Ok(plan)
    }
}

/// Extract the rewritten query: first non-empty line, quotes stripped.
pub fn parse_rewrite(raw: &str) -> Option<String> {
    let line = strip_code_fence(raw)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())?;
    let query: String = line
        .trim_matches(|c| matches!(c, '"' | '\'' | '`'))
        .trim()
        .chars()
        .take(MAX_QUERY_CHARS)
        .collect();
    if query.is_empty() { None } else { Some(query) }
}

/// The last-resort query: the user's message, truncated.
pub fn fallback_query(message: &str) -> SearchPlanEntry {
    SearchPlanEntry::new(message.trim().chars().take(MAX_QUERY_CHARS).collect::<String>())
}

/// Plan the searches for a message. Never fails.
#[tracing::instrument(name = "plan_queries", skip_all, fields(max_queries = max_queries))]
pub async fn plan_queries(
    provider: &BoxLlmProvider,
    prompts: &PromptSet,
    message: &str,
    max_queries: usize,
) -> Vec<SearchPlanEntry> {
    let request = CompletionRequest {
        temperature: Some(0.2),
        ..CompletionRequest::text(prompts.planner.clone(), vec![Message::user(message)], 600)
    };
    match provider.complete(&request).await {
        Ok(response) => match decode_plan(&response.content, max_queries) {
            Ok(plan) => {
                debug!(queries = plan.len(), "Search plan decoded");
                return plan;
            }
            Err(e) => warn!(error = %e, "Search plan unusable, rewriting query"),
        },
        Err(e) => warn!(error = %e, "Search planning failed, rewriting query"),
    }

    let request = CompletionRequest {
        temperature: Some(0.0),
        ..CompletionRequest::text(prompts.rewrite.clone(), vec![Message::user(message)], 100)
    };
    match provider.complete(&request).await {
        Ok(response) => {
            if let Some(query) = parse_rewrite(&response.content) {
                return vec![SearchPlanEntry::new(query)];
            }
            warn!("Query rewrite returned nothing, using the message");
        }
        Err(e) => warn!(error = %e, "Query rewrite failed, using the message"),
    }

    vec![fallback_query(message)]
}
