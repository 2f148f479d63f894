//! Turning refined search results into citations, the grounding brief
//! injected into the chat system prompt, and the summarizer input.

use chatrelay_types::research::SourceCitation;

use super::filter::NormalizedResult;

/// Citations returned to the client.
pub const MAX_SOURCES: usize = 12;

/// Results included in the grounding brief.
pub const MAX_BRIEF_RESULTS: usize = 8;

/// Favicon URL for a host.
pub fn favicon_url(host: &str) -> String {
    format!("https://www.google.com/s2/favicons?domain={host}&sz=64")
}

/// Number the top results as citations, 1-based.
pub fn to_citations(results: &[NormalizedResult]) -> Vec<SourceCitation> {
    results
        .iter()
        .take(MAX_SOURCES)
        .zip(1u32..)
        .map(|(r, id)| SourceCitation {
            id,
            title: r.result.title.clone(),
            link: r.result.link.clone(),
            source: r.result.source.clone(),
            date: r.result.date.clone(),
            snippet: r.result.snippet.clone(),
            favicon: Some(favicon_url(&r.host)),
        })
        .collect()
}

/// Render the grounding brief from citations.
///
/// Each entry is `[n] title`, then `Source: .. | Date: ..`, then the
/// snippet. Returns `None` when there is nothing to cite.
pub fn build_brief(citations: &[SourceCitation]) -> Option<String> {
    if citations.is_empty() {
        return None;
    }

    let mut brief = String::from(
        "Use the following web search results to answer. Cite them inline as \
         \"(source #)\" using the bracketed numbers. If the results do not cover \
         something, say so and answer from general knowledge.\n",
    );
    for citation in citations.iter().take(MAX_BRIEF_RESULTS) {
        brief.push('\n');
        brief.push_str(&format!("[{}] {}\n", citation.id, citation.title));
        brief.push_str(&format!(
            "Source: {} | Date: {}\n",
            citation.source.as_deref().unwrap_or("unknown"),
            citation.date.as_deref().unwrap_or("n/a"),
        ));
        if let Some(snippet) = &citation.snippet {
            brief.push_str(snippet);
            brief.push('\n');
        }
    }
    Some(brief.trim_end().to_string())
}

/// Render results as plain text for the summarizer (no links).
pub fn summary_input(question: &str, citations: &[SourceCitation]) -> String {
    let mut input = format!("Question: {question}\n\nSearch results:\n");
    for citation in citations.iter().take(MAX_BRIEF_RESULTS) {
        input.push_str(&format!("- {}", citation.title));
        if let Some(snippet) = &citation.snippet {
            input.push_str(&format!(": {snippet}"));
        }
        input.push('\n');
    }
    input
}

/// Keep only bullet-looking lines of a summary; `None` when nothing is left.
pub fn clean_summary(raw: &str) -> Option<String> {
    let bullets: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.contains("http://") && !line.contains("https://"))
        .map(|line| {
            let body = line
                .trim_start_matches(['-', '*', '•'])
                .trim_start();
            format!("- {body}")
        })
        .filter(|line| line.len() > 2)
        .take(6)
        .collect();
    if bullets.is_empty() {
        None
    } else {
        Some(bullets.join("\n"))
    }
}
