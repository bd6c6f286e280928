//! DuckDuckGo HTML search.
//!
//! - **Endpoint**: `https://html.duckduckgo.com/html/`, form POST with `q`.
//! - **Results**: `a.result__a` anchors carry title and link, the sibling
//!   `.result__snippet` carries the description.
//! - **Links**: result anchors point at a `/l/?uddg=<target>` redirect; the
//!   target is unwrapped so callers see the real URL.

use std::time::{Duration, Instant};

use pagesift_core::{AppConfig, SearchHit};
use reqwest::header;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use url::Url;

use super::{SearchError, SearchProvider};

const DEFAULT_BASE_URL: &str = "https://html.duckduckgo.com/html/";

/// DuckDuckGo client configuration.
#[derive(Debug, Clone)]
pub struct DuckDuckGoConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for DuckDuckGoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            user_agent: pagesift_core::config::DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl DuckDuckGoConfig {
    pub fn from_app(config: &AppConfig) -> Self {
        Self { timeout: config.search_timeout(), user_agent: config.user_agent.clone(), ..Default::default() }
    }
}

#[derive(Serialize)]
struct SearchForm<'a> {
    q: &'a str,
}

#[derive(Debug, Clone)]
pub struct DuckDuckGoClient {
    http: reqwest::Client,
    config: DuckDuckGoConfig,
}

impl DuckDuckGoClient {
    pub fn new(config: DuckDuckGoConfig) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { http, config })
    }
}

#[async_trait::async_trait]
impl SearchProvider for DuckDuckGoClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::InvalidQuery("query is empty".to_string()));
        }

        let start = Instant::now();
        tracing::debug!("searching DuckDuckGo: query={}", query);

        let response = self
            .http
            .post(&self.config.base_url)
            .header(header::ACCEPT, "text/html")
            .form(&SearchForm { q: query })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::HttpError { status: status.as_u16() });
        }

        let body = response.text().await?;
        let hits = parse_results(&body, max_results);

        tracing::debug!("search completed in {:?}, {} results", start.elapsed(), hits.len());
        Ok(hits)
    }

    fn name(&self) -> &'static str {
        "duckduckgo"
    }
}

/// Parse a results page into at most `max_results` hits.
///
/// Entries without a usable link are skipped.
pub fn parse_results(html: &str, max_results: usize) -> Vec<SearchHit> {
    let (Ok(result), Ok(anchor), Ok(snippet)) = (
        Selector::parse(".result"),
        Selector::parse("a.result__a"),
        Selector::parse(".result__snippet"),
    ) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let mut hits = Vec::new();

    for block in document.select(&result) {
        if hits.len() >= max_results {
            break;
        }

        let Some(link) = block.select(&anchor).next() else {
            continue;
        };
        let Some(url) = link.value().attr("href").and_then(unwrap_redirect) else {
            continue;
        };

        let title = element_text(link);
        let description = block.select(&snippet).next().map(element_text).unwrap_or_default();
        hits.push(SearchHit::new(if title.is_empty() { url.clone() } else { title }, url, description));
    }

    hits
}

/// Resolve a result href to the target URL.
fn unwrap_redirect(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") { format!("https:{href}") } else { href.to_string() };
    let parsed = Url::parse(&absolute).ok()?;

    if let Some((_, target)) = parsed.query_pairs().find(|(k, _)| k == "uddg") {
        return Some(target.into_owned()).filter(|t| t.starts_with("http"));
    }

    matches!(parsed.scheme(), "http" | "https").then(|| parsed.to_string())
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}
