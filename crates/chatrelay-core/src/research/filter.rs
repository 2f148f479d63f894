//! Normalization, trust filtering, deduplication, and per-domain capping
//! of raw search results.

use std::collections::{HashMap, HashSet};

use url::Url;

use chatrelay_types::research::WebResult;

/// Results kept per domain after deduplication.
pub const MAX_PER_DOMAIN: usize = 3;

/// Domains whose results are preferred when any are present.
const TRUSTED_DOMAINS: &[&str] = &[
    "nature.com",
    "sciencedirect.com",
    "arxiv.org",
    "nhs.uk",
    "mayoclinic.org",
    "bmj.com",
    "nytimes.com",
    "bbc.com",
    "who.int",
    "cdc.gov",
    "whitehouse.gov",
    "data.gov",
    "developer.mozilla.org",
    "docs.python.org",
    "nodejs.org",
    "khanacademy.org",
    "stanford.edu",
    "mit.edu",
    "reuters.com",
    "apnews.com",
];

/// A search result with a validated URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedResult {
    pub result: WebResult,
    /// Lowercased host without a leading `www.`.
    pub host: String,
    /// Path without a trailing `/`.
    pub path: String,
}

impl NormalizedResult {
    fn dedupe_key(&self) -> (String, String) {
        (self.host.clone(), self.path.clone())
    }
}

/// Validate and normalize one raw result.
///
/// Drops results without a title or link, with a non-http(s) scheme, or
/// without a host. `source` defaults to the host.
pub fn normalize(raw: WebResult) -> Option<NormalizedResult> {
    let title = raw.title.trim();
    let link = raw.link.trim();
    if title.is_empty() || link.is_empty() {
        return None;
    }

    let url = Url::parse(link).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?.to_lowercase();
    if host.is_empty() {
        return None;
    }
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    let path = url.path().trim_end_matches('/').to_string();

    let source = raw
        .source
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| host.clone());

    Some(NormalizedResult {
        result: WebResult {
            title: title.to_string(),
            link: link.to_string(),
            snippet: raw.snippet.filter(|s| !s.trim().is_empty()),
            source: Some(source),
            date: raw.date.filter(|d| !d.trim().is_empty()),
        },
        host,
        path,
    })
}

/// Whether a host belongs to a trusted institution or publisher.
pub fn is_trusted(host: &str) -> bool {
    if host.ends_with(".gov") || host.ends_with(".edu") {
        return true;
    }
    TRUSTED_DOMAINS.iter().any(|domain| {
        host == *domain
            || host
                .strip_suffix(domain)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

/// Normalize, trust-filter, dedupe, and domain-cap raw results.
///
/// When at least one trusted result exists, only trusted results are kept.
/// Order is first-seen.
pub fn refine(raw: Vec<WebResult>) -> Vec<NormalizedResult> {
    let normalized: Vec<_> = raw.into_iter().filter_map(normalize).collect();

    let any_trusted = normalized.iter().any(|r| is_trusted(&r.host));
    let candidates = normalized
        .into_iter()
        .filter(|r| !any_trusted || is_trusted(&r.host));

    let mut seen = HashSet::new();
    let mut per_domain: HashMap<String, usize> = HashMap::new();
    let mut refined = Vec::new();
    for candidate in candidates {
        if !seen.insert(candidate.dedupe_key()) {
            continue;
        }
        let count = per_domain.entry(candidate.host.clone()).or_default();
        if *count >= MAX_PER_DOMAIN {
            continue;
        }
        *count += 1;
        refined.push(candidate);
    }
    refined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::web_result;

    #[test]
    fn test_normalize_rejects_missing_fields_and_schemes() {
        assert!(normalize(web_result("", "https://a.com")).is_none());
        assert!(normalize(web_result("t", "")).is_none());
        assert!(normalize(web_result("t", "ftp://a.com/file")).is_none());
        assert!(normalize(web_result("t", "not a url")).is_none());
        assert!(normalize(web_result("t", "mailto:me@a.com")).is_none());
    }

    #[test]
    fn test_normalize_host_and_path() {
        let n = normalize(web_result("t", "https://WWW.Example.com/docs/")).unwrap();
        assert_eq!(n.host, "example.com");
        assert_eq!(n.path, "/docs");
        assert_eq!(n.result.source.as_deref(), Some("example.com"));
    }

    #[test]
    fn test_normalize_keeps_given_source() {
        let mut raw = web_result("t", "https://example.com");
        raw.source = Some("Example News".to_string());
        let n = normalize(raw).unwrap();
        assert_eq!(n.result.source.as_deref(), Some("Example News"));
    }

    #[test]
    fn test_trusted_hosts() {
        assert!(is_trusted("nasa.gov"));
        assert!(is_trusted("cs.berkeley.edu"));
        assert!(is_trusted("nature.com"));
        assert!(is_trusted("news.bbc.com"));
        assert!(!is_trusted("notnature.com"));
        assert!(!is_trusted("example.com"));
        assert!(!is_trusted("gov.example.com"));
    }

    #[test]
    fn test_refine_prefers_trusted() {
        let refined = refine(vec![
            web_result("blog", "https://blog.example.com/a"),
            web_result("paper", "https://arxiv.org/abs/1"),
            web_result("agency", "https://www.cdc.gov/flu"),
        ]);
        let hosts: Vec<_> = refined.iter().map(|r| r.host.as_str()).collect();
        assert_eq!(hosts, vec!["arxiv.org", "cdc.gov"]);
    }

    #[test]
    fn test_refine_keeps_all_when_none_trusted() {
        let refined = refine(vec![
            web_result("a", "https://a.example.com/"),
            web_result("b", "https://b.example.org/"),
        ]);
        assert_eq!(refined.len(), 2);
    }

    #[test]
    fn test_refine_dedupes_host_and_path() {
        let refined = refine(vec![
            web_result("one", "https://example.com/page"),
            web_result("two", "https://www.example.com/page/"),
            web_result("three", "http://EXAMPLE.com/page?ref=x"),
            web_result("four", "https://example.com/other"),
        ]);
        let titles: Vec<_> = refined.iter().map(|r| r.result.title.as_str()).collect();
        assert_eq!(titles, vec!["one", "four"]);
    }

    #[test]
    fn test_refine_caps_per_domain() {
        let raw = (0..6)
            .map(|i| web_result(&format!("r{i}"), &format!("https://example.com/{i}")))
            .chain(std::iter::once(web_result("z", "https://other.com/")))
            .collect();
        let refined = refine(raw);
        assert_eq!(refined.iter().filter(|r| r.host == "example.com").count(), 3);
        assert_eq!(refined.len(), 4);
        assert_eq!(refined[0].result.title, "r0");
        assert_eq!(refined[3].result.title, "z");
    }
}
