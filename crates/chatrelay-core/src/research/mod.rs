//! Web research pipeline.
//!
//! plan queries -> pick vertical -> run searches sequentially -> refine ->
//! number citations -> build the grounding brief -> summarize.
//! Every model and search call degrades independently; research never
//! fails a chat turn.

pub mod brief;
pub mod filter;
pub mod intent;
pub mod planner;

use std::sync::Arc;

use tracing::{debug, info, warn};

use chatrelay_types::chat::ResearchArtifacts;
use chatrelay_types::llm::{CompletionRequest, Message};
use chatrelay_types::research::SourceCitation;

use crate::chat::prompt::PromptSet;
use crate::llm::box_provider::BoxLlmProvider;
use crate::search::provider::BoxSearchProvider;

/// Runs the research pipeline against one search backend.
#[derive(Clone)]
pub struct WebResearcher {
    search: Arc<BoxSearchProvider>,
    max_queries: usize,
    results_per_query: u32,
}

impl WebResearcher {
    pub fn new(search: BoxSearchProvider, max_queries: usize, results_per_query: u32) -> Self {
        Self {
            search: Arc::new(search),
            max_queries,
            results_per_query,
        }
    }

    /// Research a user message. Returns empty artifacts when nothing usable
    /// was found.
    #[tracing::instrument(name = "web_research", skip_all, fields(search = %self.search.name()))]
    pub async fn research(
        &self,
        provider: &BoxLlmProvider,
        prompts: &PromptSet,
        message: &str,
    ) -> ResearchArtifacts {
        let plan = planner::plan_queries(provider, prompts, message, self.max_queries).await;
        let mode = intent::detect_mode(message);

        let mut raw = Vec::new();
        for entry in plan.iter().take(self.max_queries) {
            match self
                .search
                .search(&entry.query, mode, self.results_per_query)
                .await
            {
                Ok(results) => {
                    debug!(query = %entry.query, %mode, results = results.len(), "Search completed");
                    raw.extend(results);
                }
                Err(e) => warn!(query = %entry.query, error = %e, "Search failed, skipping query"),
            }
        }

        let refined = filter::refine(raw);
        let sources = brief::to_citations(&refined);
        if sources.is_empty() {
            info!(queries = plan.len(), "Web research found no usable results");
            return ResearchArtifacts::default();
        }

        let brief = brief::build_brief(&sources);
        let summary = self.summarize(provider, prompts, message, &sources).await;
        info!(
            queries = plan.len(),
            sources = sources.len(),
            summary = summary.is_some(),
            "Web research completed"
        );

        ResearchArtifacts {
            sources,
            summary,
            brief,
        }
    }

    async fn summarize(
        &self,
        provider: &BoxLlmProvider,
        prompts: &PromptSet,
        message: &str,
        sources: &[SourceCitation],
    ) -> Option<String> {
        let request = CompletionRequest {
            temperature: Some(0.3),
            ..CompletionRequest::text(
                prompts.summary.clone(),
                vec![Message::user(brief::summary_input(message, sources))],
                400,
            )
        };
        match provider.complete(&request).await {
            Ok(response) => brief::clean_summary(&response.content),
            Err(e) => {
                warn!(error = %e, "Research summary failed");
                None
            }
        }
    }
}
