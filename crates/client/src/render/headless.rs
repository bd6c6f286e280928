//! Headless Chrome/Chromium renderer using chromiumoxide.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures_util::{Stream, StreamExt};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use url::Url;

use super::{PageRenderer, RenderConfig, RenderError, RenderOutcome};
use crate::fetch::canonicalize;

/// Drops fixed/sticky elements stacked above the page (cookie walls, modals,
/// chat widgets) and unlocks scrolling.
const REMOVE_OVERLAYS_JS: &str = r#"
(() => {
    let removed = 0;
    for (const el of Array.from(document.querySelectorAll('body *'))) {
        const style = window.getComputedStyle(el);
        const z = parseInt(style.zIndex, 10);
        if ((style.position === 'fixed' || style.position === 'sticky') && !Number.isNaN(z) && z >= 100) {
            el.remove();
            removed += 1;
        }
    }
    if (document.body) {
        document.body.style.overflow = 'auto';
    }
    return removed;
})()
"#;

/// Headless browser shared by all requests; one tab per render.
pub struct HeadlessRenderer {
    browser: Browser,
    sessions: Arc<Semaphore>,
    config: RenderConfig,
    handler: JoinHandle<()>,
}

impl HeadlessRenderer {
    /// Launch the browser.
    ///
    /// The browser uses a background task to handle Chrome DevTools Protocol
    /// events. Fails when no browser binary is found or it does not start.
    pub async fn launch(config: RenderConfig) -> Result<Self, RenderError> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(config.timeout)
            .args(config.browser_args.iter().cloned());
        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &config.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        let (browser, mut handler) = Browser::launch(builder.build().map_err(RenderError::BrowserLaunch)?)
            .await
            .map_err(|e| RenderError::BrowserLaunch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            let errors = drain_events(&mut handler).await;
            tracing::warn!(errors, "browser event stream ended");
        });

        let sessions = Arc::new(Semaphore::new(config.max_sessions.max(1)));
        Ok(Self { browser, sessions, config, handler })
    }

    async fn capture(&self, page: &Page, url: &Url) -> Result<(String, Url), RenderError> {
        page.goto(url.as_str())
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        tokio::time::sleep(self.config.settle).await;

        match page.evaluate(REMOVE_OVERLAYS_JS).await {
            Ok(result) => tracing::debug!("overlay sweep on {}: {:?}", url, result.into_value::<u64>().ok()),
            Err(e) => tracing::debug!("overlay sweep on {} failed: {e}", url),
        }

        let html = page
            .content()
            .await
            .map_err(|e| RenderError::ContentRetrieval(e.to_string()))?;

        let final_url = page
            .url()
            .await
            .map_err(|e| RenderError::ContentRetrieval(e.to_string()))?
            .and_then(|u| Url::parse(&u).ok())
            .unwrap_or_else(|| url.clone());

        Ok((html, final_url))
    }

    /// Open a tab, capture `url` and close the tab, all within the render
    /// timeout. Waiting for a free session slot is not counted.
    async fn render_url(&self, url: &Url) -> Result<(String, Url), RenderError> {
        let _permit = self.sessions.acquire().await.map_err(|_| RenderError::BrowserClosed)?;
        if self.handler.is_finished() {
            return Err(RenderError::BrowserClosed);
        }

        let deadline = self.config.timeout;
        let start = Instant::now();

        let work = async {
            let page = self
                .browser
                .new_page("about:blank")
                .await
                .map_err(|e| RenderError::Navigation(e.to_string()))?;
            let tab = Tab::new(page);
            let captured = match tab.page() {
                Some(page) => self.capture(page, url).await,
                None => Err(RenderError::BrowserClosed),
            };
            Ok::<_, RenderError>((tab, captured))
        };

        // On timeout the future is dropped and the tab guard closes the page.
        let (tab, captured) = within(deadline, work).await?;

        tab.close(deadline.saturating_sub(start.elapsed())).await;
        captured
    }
}

#[async_trait::async_trait]
impl PageRenderer for HeadlessRenderer {
    async fn render(&self, url: &str) -> RenderOutcome {
        let url = match canonicalize(url) {
            Ok(url) => url,
            Err(e) => return RenderError::InvalidUrl(e.to_string()).into(),
        };

        let start = Instant::now();
        match self.render_url(&url).await {
            Ok((html, final_url)) => {
                let text = self.config.filter.extract(&html, &final_url);
                tracing::debug!(
                    "rendered {} in {}ms ({} html bytes, {} text chars)",
                    url,
                    start.elapsed().as_millis(),
                    html.len(),
                    text.chars().count()
                );
                RenderOutcome::ok(html, text)
            }
            Err(e) => {
                tracing::debug!("render of {} failed after {}ms: {e}", url, start.elapsed().as_millis());
                e.into()
            }
        }
    }
}

impl Drop for HeadlessRenderer {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// Drive the CDP event stream until it ends. Undecodable messages surface as
/// errors and are skipped; only the end of the stream means the browser is
/// gone. Returns the number of errors seen.
async fn drain_events<S, E>(events: &mut S) -> usize
where
    S: Stream<Item = Result<(), E>> + Unpin,
    E: std::fmt::Display,
{
    let mut errors = 0;
    while let Some(event) = events.next().await {
        if let Err(e) = event {
            errors += 1;
            tracing::debug!("browser handler event error: {e}");
        }
    }
    errors
}

/// Run `work` under one render deadline.
async fn within<T, F>(deadline: Duration, work: F) -> Result<T, RenderError>
where
    F: Future<Output = Result<T, RenderError>>,
{
    tokio::time::timeout(deadline, work)
        .await
        .unwrap_or_else(|_| Err(RenderError::Timeout(deadline.as_millis())))
}

/// An open tab that is closed on every exit path, including cancellation.
struct Tab {
    page: Option<Page>,
}

impl Tab {
    fn new(page: Page) -> Self {
        Self { page: Some(page) }
    }

    fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    /// Close within `budget`; past it the close is left to `Drop`.
    async fn close(mut self, budget: Duration) {
        let Some(page) = self.page.clone() else {
            return;
        };

        match tokio::time::timeout(budget, page.close()).await {
            Ok(result) => {
                self.page = None;
                if let Err(e) = result {
                    tracing::debug!("failed to close tab: {e}");
                }
            }
            Err(_) => tracing::debug!("tab close exceeded render budget, closing in background"),
        }
    }
}

impl Drop for Tab {
    fn drop(&mut self) {
        if let Some(page) = self.page.take()
            && let Ok(runtime) = tokio::runtime::Handle::try_current()
        {
            runtime.spawn(async move {
                let _ = page.close().await;
            });
        }
    }
}
