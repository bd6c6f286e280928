//! Headless browser rendering for JS-heavy pages.
//!
//! The render tier is an optional capability. Whether it exists is decided
//! once at startup by [`start_renderer`]: it is absent when disabled in
//! configuration, when the crate is built without the `render` feature, or
//! when no browser can be launched.

#[cfg(feature = "render")]
mod headless;

#[cfg(feature = "render")]
pub use headless::HeadlessRenderer;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pagesift_core::AppConfig;
use thiserror::Error;

use crate::extract::ContentFilter;

/// Errors that can occur during page rendering.
///
/// These never leave the tier; they become the message of a failed
/// [`RenderOutcome`].
#[derive(Debug, Error)]
pub enum RenderError {
    /// Failed to launch or connect to browser.
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    /// URL not usable by the browser.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to open a tab or navigate to URL.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Failed to get page content.
    #[error("content retrieval failed: {0}")]
    ContentRetrieval(String),

    /// Timeout waiting for page to load.
    #[error("render timeout after {0}ms")]
    Timeout(u128),

    /// Browser closed unexpectedly.
    #[error("browser closed unexpectedly")]
    BrowserClosed,
}

/// Immutable render tier configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Budget for opening the tab, navigating and capturing the DOM.
    pub timeout: Duration,
    /// Pause after navigation so late scripts can fill the page.
    pub settle: Duration,
    pub headless: bool,
    /// Browser binary; auto-detected when `None`.
    pub chrome_executable: Option<PathBuf>,
    pub browser_args: Vec<String>,
    /// Maximum number of tabs open at once.
    pub max_sessions: usize,
    /// Content-area heuristics applied to the captured DOM.
    pub filter: ContentFilter,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            settle: Duration::from_secs(1),
            headless: true,
            chrome_executable: None,
            browser_args: vec!["--no-sandbox".into(), "--disable-dev-shm-usage".into()],
            max_sessions: 2,
            filter: ContentFilter::default(),
        }
    }
}

impl RenderConfig {
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            timeout: config.render_timeout(),
            settle: Duration::from_millis(config.render_settle_ms),
            headless: config.headless,
            chrome_executable: config.chrome_executable.clone(),
            browser_args: config.browser_args.clone(),
            max_sessions: config.max_render_sessions,
            filter: ContentFilter::new(config.word_count_threshold, config.excluded_tags.clone()),
        }
    }
}

/// Result of rendering a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOutcome {
    pub success: bool,
    /// Captured DOM HTML.
    pub html: Option<String>,
    /// Content-area text in markdown-like form. Preferred over `html`.
    pub rendered_text: Option<String>,
    pub error_message: Option<String>,
}

impl RenderOutcome {
    pub fn ok(html: String, rendered_text: String) -> Self {
        Self { success: true, html: Some(html), rendered_text: Some(rendered_text), error_message: None }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self { success: false, html: None, rendered_text: None, error_message: Some(message.into()) }
    }
}

impl From<RenderError> for RenderOutcome {
    fn from(err: RenderError) -> Self {
        RenderOutcome::failed(err.to_string())
    }
}

/// The render tier as seen by the orchestrator.
#[async_trait::async_trait]
pub trait PageRenderer: Send + Sync {
    /// Render `url`. Never fails; problems land in the outcome.
    async fn render(&self, url: &str) -> RenderOutcome;
}

/// Resolve the render capability for this process.
///
/// Returns `None` when the tier is categorically unavailable. The caller keeps
/// the result for the lifetime of the process.
pub async fn start_renderer(enabled: bool, config: RenderConfig) -> Option<Arc<dyn PageRenderer>> {
    if !enabled {
        tracing::info!("render tier disabled by configuration");
        return None;
    }

    #[cfg(feature = "render")]
    {
        match HeadlessRenderer::launch(config).await {
            Ok(renderer) => {
                tracing::info!("render tier available");
                Some(Arc::new(renderer) as Arc<dyn PageRenderer>)
            }
            Err(e) => {
                tracing::warn!("render tier unavailable, using lightweight fetch only: {e}");
                None
            }
        }
    }

    #[cfg(not(feature = "render"))]
    {
        let _ = config;
        tracing::warn!("render tier unavailable: built without the `render` feature");
        None
    }
}
