//! Lightweight fetch tier: a single plain HTTP GET, no script execution.
//!
//! - Fixed browser-like User-Agent from configuration
//! - Follows up to 5 redirects
//! - Max body bytes: 5MB (configurable), enforced while streaming
//! - The caller's timeout covers the whole exchange including the body
//! - No retries; falling back is the orchestrator's job

pub mod url;

use std::time::{Duration, Instant};

use bytes::BytesMut;
use pagesift_core::AppConfig;
use pagesift_core::config::DEFAULT_USER_AGENT;
use reqwest::{Client, Response, header};

pub use self::url::{UrlError, canonicalize};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string sent with every request.
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,

    /// TCP/TLS connect timeout (default: 5s)
    pub connect_timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_bytes: 5 * 1024 * 1024,
            max_redirects: 5,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl FetchConfig {
    pub fn from_app(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), max_bytes: config.max_bytes, ..Default::default() }
    }
}

/// Why a lightweight fetch produced no HTML.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error(transparent)]
    Url(#[from] UrlError),

    #[error("network error: {0}")]
    Network(String),

    #[error("timeout after {0}ms")]
    Timeout(u128),

    #[error("status {0}")]
    HttpStatus(u16),

    #[error("{len} bytes exceeds {max}")]
    TooLarge { len: usize, max: usize },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err.to_string())
    }
}

/// Result of one lightweight fetch attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFetchOutcome {
    /// True for a 2xx response whose body was read.
    pub status_ok: bool,
    /// HTTP status, when a response arrived at all.
    pub status: Option<u16>,
    pub html: Option<String>,
    pub error_message: Option<String>,
}

impl RawFetchOutcome {
    pub fn ok(status: u16, html: String) -> Self {
        Self { status_ok: true, status: Some(status), html: Some(html), error_message: None }
    }

    pub fn failed(status: Option<u16>, message: impl Into<String>) -> Self {
        Self { status_ok: false, status, html: None, error_message: Some(message.into()) }
    }
}

/// The lightweight tier as seen by the orchestrator.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` within `timeout`. Never fails; problems land in the outcome.
    async fn fetch(&self, url: &str, timeout: Duration) -> RawFetchOutcome;
}

/// reqwest-backed lightweight fetcher.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.connect_timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { http, config })
    }

    async fn try_fetch(&self, url_str: &str) -> Result<(u16, String), FetchError> {
        let url = canonicalize(url_str)?;

        let response = self
            .http
            .get(url.as_str())
            .header(header::ACCEPT, "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(FetchError::TooLarge { len: len as usize, max: self.config.max_bytes });
        }

        let body = self.read_body(response).await?;
        Ok((status.as_u16(), String::from_utf8_lossy(&body).into_owned()))
    }

    async fn read_body(&self, mut response: Response) -> Result<BytesMut, FetchError> {
        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > self.config.max_bytes {
                return Err(FetchError::TooLarge { len: body.len() + chunk.len(), max: self.config.max_bytes });
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[async_trait::async_trait]
impl PageFetcher for FetchClient {
    async fn fetch(&self, url: &str, timeout: Duration) -> RawFetchOutcome {
        let start = Instant::now();

        let result = match tokio::time::timeout(timeout, self.try_fetch(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(timeout.as_millis())),
        };

        match result {
            Ok((status, html)) => {
                tracing::debug!("fetched {} in {}ms ({} bytes)", url, start.elapsed().as_millis(), html.len());
                RawFetchOutcome::ok(status, html)
            }
            Err(e) => {
                tracing::debug!("fetch of {} failed after {}ms: {}", url, start.elapsed().as_millis(), e);
                let status = match e {
                    FetchError::HttpStatus(code) => Some(code),
                    _ => None,
                };
                RawFetchOutcome::failed(status, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header as header_eq, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = "<html><head><title>T</title></head><body><p>Hello</p></body></html>";

    fn client() -> FetchClient {
        FetchClient::new(FetchConfig::default()).unwrap()
    }

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_fetch_config_from_app() {
        let app = AppConfig { user_agent: "custom/1.0".into(), max_bytes: 1024, ..Default::default() };
        let config = FetchConfig::from_app(&app);
        assert_eq!(config.user_agent, "custom/1.0");
        assert_eq!(config.max_bytes, 1024);
    }

    #[tokio::test]
    async fn test_fetch_success_sends_identity_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header_eq("user-agent", DEFAULT_USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client().fetch(&format!("{}/page", server.uri()), Duration::from_secs(5)).await;

        assert!(outcome.status_ok);
        assert_eq!(outcome.status, Some(200));
        assert_eq!(outcome.html.as_deref(), Some(PAGE));
        assert!(outcome.error_message.is_none());
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client().fetch(&format!("{}/missing", server.uri()), Duration::from_secs(5)).await;

        assert!(!outcome.status_ok);
        assert_eq!(outcome.status, Some(404));
        assert!(outcome.html.is_none());
        assert_eq!(outcome.error_message.as_deref(), Some("status 404"));
    }

    #[tokio::test]
    async fn test_fetch_follows_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/new"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let outcome = client().fetch(&format!("{}/old", server.uri()), Duration::from_secs(5)).await;

        assert!(outcome.status_ok);
        assert_eq!(outcome.html.as_deref(), Some(PAGE));
    }

    #[tokio::test]
    async fn test_fetch_enforces_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let start = Instant::now();
        let outcome = client().fetch(&server.uri(), Duration::from_millis(200)).await;

        assert!(start.elapsed() < Duration::from_secs(3));
        assert!(!outcome.status_ok);
        assert!(outcome.error_message.unwrap().contains("timeout"));
    }

    #[tokio::test]
    async fn test_fetch_rejects_oversized_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(100)))
            .mount(&server)
            .await;

        let client = FetchClient::new(FetchConfig { max_bytes: 10, ..Default::default() }).unwrap();
        let outcome = client.fetch(&server.uri(), Duration::from_secs(5)).await;

        assert!(!outcome.status_ok);
        assert!(outcome.error_message.unwrap().contains("exceeds 10"));
    }

    #[tokio::test]
    async fn test_fetch_unusable_url_fails_without_network() {
        let outcome = client().fetch("ftp://example.com/file", Duration::from_secs(1)).await;
        assert!(!outcome.status_ok);
        assert!(outcome.status.is_none());
        assert!(outcome.error_message.unwrap().contains("unsupported scheme"));
    }
}
