//! Fallback web search against DuckDuckGo's HTML endpoint (no API key required).
//!
//! The result markup is an unstable external contract; everything that depends on it lives
//! in [`parse_results`], so format drift shows up as an empty result list, not a fault.

use std::time::Duration;

use reqwest::Url;
use scarlet_core::{SearchConfig, SearchHit, SearchOutcome, WebSearch};
use scraper::{Html, Selector};
use thiserror::Error;

const RESULT_LINK_SELECTOR: &str = "a.result__a";
const REDIRECT_TARGET_PARAM: &str = "uddg";

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("search timed out after {0}s")]
    Timeout(u64),

    #[error("{0}")]
    Transport(#[source] reqwest::Error),

    #[error("search service answered HTTP {0}")]
    Status(reqwest::StatusCode),
}

/// DuckDuckGo HTML scraper with a browser-like user agent and a bounded timeout.
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    endpoint: String,
    timeout_secs: u64,
    max_results: usize,
}

impl DuckDuckGoSearch {
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(SearchError::Client)?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            timeout_secs: config.timeout_secs,
            max_results: config.max_results,
        })
    }

    fn classify(&self, e: reqwest::Error) -> SearchError {
        if e.is_timeout() {
            SearchError::Timeout(self.timeout_secs)
        } else {
            SearchError::Transport(e)
        }
    }

    /// Fetches the result page and extracts up to `max_results` hits.
    pub async fn fetch(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status));
        }

        let html = response.text().await.map_err(|e| self.classify(e))?;
        Ok(parse_results(&html, self.max_results))
    }
}

#[async_trait::async_trait]
impl WebSearch for DuckDuckGoSearch {
    async fn search(&self, query: &str) -> SearchOutcome {
        match self.fetch(query).await {
            Ok(hits) => {
                tracing::info!(target: "scarlet::search", hits = hits.len(), "web search for '{}' done", query);
                SearchOutcome::from_hits(hits)
            }
            Err(e) => {
                tracing::warn!(target: "scarlet::search", error = %e, "web search for '{}' failed", query);
                SearchOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Extracts `(title, link)` pairs from a DuckDuckGo HTML result page, in page order.
///
/// Anchors without text or `href` are skipped. Redirect links are unwrapped to their target.
pub fn parse_results(html: &str, max: usize) -> Vec<SearchHit> {
    let Ok(selector) = Selector::parse(RESULT_LINK_SELECTOR) else {
        return Vec::new();
    };
    let document = Html::parse_document(html);
    document
        .select(&selector)
        .filter_map(|anchor| {
            let title = anchor.text().collect::<String>();
            let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
            let href = anchor.value().attr("href")?.trim();
            if title.is_empty() || href.is_empty() {
                return None;
            }
            Some(SearchHit {
                title,
                link: resolve_link(href),
            })
        })
        .take(max)
        .collect()
}

/// `//duckduckgo.com/l/?uddg=<encoded>` becomes the decoded target; other protocol-relative
/// links get `https:`.
fn resolve_link(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };
    Url::parse(&absolute)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(k, _)| k == REDIRECT_TARGET_PARAM)
                .map(|(_, v)| v.into_owned())
        })
        .unwrap_or(absolute)
}
