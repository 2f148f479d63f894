//! SerpAPI Google search client.
//!
//! Web mode reads `organic_results`; news mode sets `tbm=nws` and reads
//! `news_results`. Entries without a title or link are dropped.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;

use chatrelay_core::search::provider::SearchProvider;
use chatrelay_types::config::ResearchConfig;
use chatrelay_types::research::{SearchError, SearchMode, WebResult};

const SERPAPI_URL: &str = "https://serpapi.com/search";

/// SerpAPI-backed [`SearchProvider`].
///
/// Does NOT derive Debug; the API key is sent as a query parameter.
pub struct SerpApiClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    gl: String,
    hl: String,
}

impl SerpApiClient {
    pub fn new(api_key: SecretString, config: &ResearchConfig) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| SearchError::Request(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            base_url: SERPAPI_URL.to_string(),
            gl: config.gl.clone(),
            hl: config.hl.clone(),
        })
    }

    /// Override the endpoint (local proxies and tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn params(&self, query: &str, mode: SearchMode, limit: u32) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("engine", "google".to_string()),
            ("q", query.to_string()),
            ("num", limit.to_string()),
            ("gl", self.gl.clone()),
            ("hl", self.hl.clone()),
            ("no_cache", "true".to_string()),
        ];
        if mode == SearchMode::News {
            params.push(("tbm", "nws".to_string()));
        }
        params
    }
}

impl SearchProvider for SerpApiClient {
    fn name(&self) -> &str {
        "serpapi"
    }

    async fn search(
        &self,
        query: &str,
        mode: SearchMode,
        limit: u32,
    ) -> Result<Vec<WebResult>, SearchError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&self.params(query, mode, limit))
            .query(&[("api_key", self.api_key.expose_secret())])
            .send()
            .await
            .map_err(|e| SearchError::Request(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::Decode(e.without_url().to_string()))?;
        let results = parse_results(&body, mode);
        debug!(%mode, count = results.len(), "serpapi results");
        Ok(results)
    }
}

/// Extract results for `mode` from a SerpAPI response body.
pub fn parse_results(body: &Value, mode: SearchMode) -> Vec<WebResult> {
    let key = match mode {
        SearchMode::Web => "organic_results",
        SearchMode::News => "news_results",
    };
    body.get(key)
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(parse_entry).collect())
        .unwrap_or_default()
}

fn parse_entry(entry: &Value) -> Option<WebResult> {
    let text = |field: &str| {
        entry
            .get(field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let title = text("title")?;
    let link = text("link")?;
    // News results carry `source` as an object with a `name`.
    let source = text("source").or_else(|| {
        entry
            .get("source")
            .and_then(|s| s.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string)
    });

    Some(WebResult {
        title,
        link,
        snippet: text("snippet"),
        source,
        date: text("date").or_else(|| text("date_published")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::serve_fixed;
    use serde_json::json;

    fn client() -> SerpApiClient {
        SerpApiClient::new(SecretString::from("k".to_string()), &ResearchConfig::default()).unwrap()
    }

    #[test]
    fn test_params_news_adds_tbm() {
        let c = client();
        let web = c.params("rust", SearchMode::Web, 10);
        assert!(web.contains(&("gl", "us".to_string())));
        assert!(web.contains(&("no_cache", "true".to_string())));
        assert!(!web.iter().any(|(k, _)| *k == "tbm"));

        let news = c.params("rust", SearchMode::News, 5);
        assert!(news.contains(&("tbm", "nws".to_string())));
        assert!(news.contains(&("num", "5".to_string())));
    }

    #[test]
    fn test_parse_organic() {
        let body = json!({
            "organic_results": [
                {"title": "Rust", "link": "https://www.rust-lang.org/", "snippet": "A language", "date_published": "2024"},
                {"title": "", "link": "https://skip.example.com/"},
                {"title": "No link"}
            ]
        });
        let results = parse_results(&body, SearchMode::Web);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Rust");
        assert_eq!(results[0].snippet.as_deref(), Some("A language"));
        assert_eq!(results[0].date.as_deref(), Some("2024"));
        assert!(results[0].source.is_none());
    }

    #[test]
    fn test_parse_news_source_object() {
        let body = json!({
            "news_results": [
                {"title": "Launch", "link": "https://news.example.com/a", "source": {"name": "Example News"}, "date": "1 hour ago"}
            ],
            "organic_results": [{"title": "ignored", "link": "https://x.example.com"}]
        });
        let results = parse_results(&body, SearchMode::News);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source.as_deref(), Some("Example News"));
        assert_eq!(results[0].date.as_deref(), Some("1 hour ago"));
    }

    #[test]
    fn test_parse_missing_section() {
        assert!(parse_results(&json!({"error": "quota"}), SearchMode::Web).is_empty());
    }

    fn keyed_client(base_url: &str) -> SerpApiClient {
        SerpApiClient::new(
            SecretString::from("SUPERSECRETKEY".to_string()),
            &ResearchConfig::default(),
        )
        .unwrap()
        .with_base_url(base_url)
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_request_error() {
        let c = client().with_base_url("http://127.0.0.1:9/search");
        let err = c.search("q", SearchMode::Web, 3).await.unwrap_err();
        assert!(matches!(err, SearchError::Request(_)));
    }

    #[tokio::test]
    async fn test_request_error_omits_api_key() {
        let err = keyed_client("http://127.0.0.1:9/search")
            .search("q", SearchMode::Web, 3)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Request(_)));
        assert!(!err.to_string().contains("SUPERSECRETKEY"), "{err}");
    }

    #[tokio::test]
    async fn test_decode_error_omits_api_key() {
        let base = serve_fixed("200 OK", "application/json", "not json".to_string()).await;
        let err = keyed_client(&format!("{base}/search"))
            .search("q", SearchMode::News, 3)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Decode(_)));
        assert!(!err.to_string().contains("SUPERSECRETKEY"), "{err}");
    }

    #[tokio::test]
    async fn test_search_reads_results_over_http() {
        let body = json!({
            "organic_results": [{"title": "Rust", "link": "https://www.rust-lang.org/"}]
        });
        let base = serve_fixed("200 OK", "application/json", body.to_string()).await;
        let results = keyed_client(&format!("{base}/search"))
            .search("rust", SearchMode::Web, 3)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].link, "https://www.rust-lang.org/");
    }
}
