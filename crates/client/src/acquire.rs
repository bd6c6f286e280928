//! Tiered content acquisition.
//!
//! The orchestrator walks a fixed state machine for each request:
//!
//! ```text
//! Start ──(renderer present)──▶ TryRender ──(failed | empty)──▶ TryLightweight ──▶ Done
//!   │                              │                                 ▲
//!   └──────(renderer absent)───────┼─────────────────────────────────┘
//!                                  └──(content)──▶ Done
//! ```
//!
//! Each tier runs at most once and the render tier always finishes before the
//! lightweight tier starts. Whatever happens inside the tiers, the caller gets
//! an [`AcquisitionResult`]; total failure is `TierUsed::None` with empty
//! content.

use std::sync::Arc;
use std::time::{Duration, Instant};

use pagesift_core::{AcquisitionResult, AppConfig, AttemptOutcome, FetchMode, FetchRequest, TierAttempt, TierUsed};

use crate::extract::{clean_text, resolve_title, tidy_text, truncate_chars};
use crate::fetch::{FetchClient, FetchConfig, FetchError, PageFetcher};
use crate::render::{PageRenderer, RenderConfig, start_renderer};

/// Per-tier settings the orchestrator itself needs.
#[derive(Debug, Clone)]
pub struct TierConfig {
    /// Lightweight timeout for enrichment requests.
    pub enrichment_fetch_timeout: Duration,
    /// Lightweight timeout for direct fetches.
    pub direct_fetch_timeout: Duration,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self { enrichment_fetch_timeout: Duration::from_secs(5), direct_fetch_timeout: Duration::from_secs(15) }
    }
}

impl TierConfig {
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            enrichment_fetch_timeout: config.fetch_timeout(FetchMode::Enrichment),
            direct_fetch_timeout: config.fetch_timeout(FetchMode::DirectFetch),
        }
    }

    pub fn fetch_timeout(&self, mode: FetchMode) -> Duration {
        match mode {
            FetchMode::Enrichment => self.enrichment_fetch_timeout,
            FetchMode::DirectFetch => self.direct_fetch_timeout,
        }
    }
}

enum Stage {
    Start,
    TryRender,
    TryLightweight,
    Done(Harvest),
}

/// What the pipeline ended up with before budgeting.
struct Harvest {
    tier: TierUsed,
    text: String,
    /// HTML used for the title.
    html: Option<String>,
}

impl Harvest {
    fn nothing(html: Option<String>) -> Self {
        Self { tier: TierUsed::None, text: String::new(), html }
    }
}

/// The fallback orchestrator. Cheap to share behind an `Arc`.
pub struct Acquirer {
    fetcher: Arc<dyn PageFetcher>,
    renderer: Option<Arc<dyn PageRenderer>>,
    tiers: TierConfig,
}

impl Acquirer {
    /// `renderer` is the render capability resolved at startup; `None`
    /// means the render tier is never attempted.
    pub fn new(fetcher: Arc<dyn PageFetcher>, renderer: Option<Arc<dyn PageRenderer>>, tiers: TierConfig) -> Self {
        Self { fetcher, renderer, tiers }
    }

    /// Build the production tiers from configuration, launching the browser
    /// when rendering is enabled.
    pub async fn from_config(config: &AppConfig) -> Result<Self, FetchError> {
        let fetcher = FetchClient::new(FetchConfig::from_app(config))?;
        let renderer = start_renderer(config.render_enabled, RenderConfig::from_app(config)).await;

        Ok(Self::new(Arc::new(fetcher), renderer, TierConfig::from_app(config)))
    }

    /// Whether the render tier exists in this deployment.
    pub fn render_available(&self) -> bool {
        self.renderer.is_some()
    }

    /// Run the tiers for one request and return a bounded result.
    pub async fn acquire(&self, request: &FetchRequest) -> AcquisitionResult {
        let url = request.url();
        let start = Instant::now();
        let mut attempts = Vec::new();
        let mut seen_html: Option<String> = None;

        tracing::info!(url, mode = ?request.mode(), "acquiring content");

        let mut stage = Stage::Start;
        let harvest = loop {
            stage = match stage {
                Stage::Start => {
                    if self.renderer.is_some() {
                        Stage::TryRender
                    } else {
                        Stage::TryLightweight
                    }
                }
                Stage::TryRender => match self.try_render(url, &mut attempts, &mut seen_html).await {
                    Some(harvest) => Stage::Done(harvest),
                    None => Stage::TryLightweight,
                },
                Stage::TryLightweight => {
                    let timeout = self.tiers.fetch_timeout(request.mode());
                    Stage::Done(self.try_lightweight(url, timeout, &mut attempts, seen_html.take()).await)
                }
                Stage::Done(harvest) => break harvest,
            };
        };

        let title = resolve_title(harvest.html.as_deref(), url);
        let bounded = truncate_chars(&harvest.text, request.size_budget());

        tracing::info!(
            url,
            tier = ?harvest.tier,
            chars = bounded.text.chars().count(),
            truncated = bounded.truncated,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "acquisition finished"
        );

        AcquisitionResult {
            url: url.to_string(),
            title,
            content: bounded.text,
            tier_used: harvest.tier,
            truncated: bounded.truncated,
            attempts,
        }
    }

    /// `None` means fall through to the lightweight tier.
    async fn try_render(
        &self, url: &str, attempts: &mut Vec<TierAttempt>, seen_html: &mut Option<String>,
    ) -> Option<Harvest> {
        let renderer = self.renderer.as_ref()?;
        let outcome = renderer.render(url).await;

        if !outcome.success {
            let reason = outcome.error_message.unwrap_or_else(|| "render failed".to_string());
            tracing::warn!("render tier failed for {}: {}", url, reason);
            attempts.push(TierAttempt { tier: TierUsed::Render, outcome: AttemptOutcome::Failed(reason) });
            return None;
        }

        // Rendered text is already decoded content, so only HTML is parsed.
        let text = match outcome.rendered_text.as_deref().filter(|t| !t.trim().is_empty()) {
            Some(rendered) => tidy_text(rendered),
            None => outcome.html.as_deref().map(clean_text).unwrap_or_default(),
        };

        if text.is_empty() {
            tracing::warn!("render tier produced no content for {}", url);
            attempts.push(TierAttempt { tier: TierUsed::Render, outcome: AttemptOutcome::Empty });
            *seen_html = outcome.html;
            return None;
        }

        attempts.push(TierAttempt { tier: TierUsed::Render, outcome: AttemptOutcome::Succeeded });
        Some(Harvest { tier: TierUsed::Render, text, html: outcome.html })
    }

    async fn try_lightweight(
        &self, url: &str, timeout: Duration, attempts: &mut Vec<TierAttempt>, seen_html: Option<String>,
    ) -> Harvest {
        let outcome = self.fetcher.fetch(url, timeout).await;

        let html = match outcome.html {
            Some(html) if outcome.status_ok => html,
            _ => {
                let reason = outcome.error_message.unwrap_or_else(|| "fetch failed".to_string());
                tracing::warn!("lightweight tier failed for {}: {}", url, reason);
                attempts.push(TierAttempt { tier: TierUsed::LightweightHttp, outcome: AttemptOutcome::Failed(reason) });
                return Harvest::nothing(seen_html);
            }
        };

        let text = clean_text(&html);
        if text.is_empty() {
            tracing::warn!("lightweight tier produced no content for {}", url);
            attempts.push(TierAttempt { tier: TierUsed::LightweightHttp, outcome: AttemptOutcome::Empty });
            return Harvest::nothing(Some(html));
        }

        attempts.push(TierAttempt { tier: TierUsed::LightweightHttp, outcome: AttemptOutcome::Succeeded });
        Harvest { tier: TierUsed::LightweightHttp, text, html: Some(html) }
    }
}
