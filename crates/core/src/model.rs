//! Request and result types for content acquisition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Which caller an acquisition runs on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// Improving snippets of search results.
    Enrichment,
    /// A direct "fetch this URL" request.
    DirectFetch,
}

/// A validated request for page content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    url: String,
    size_budget: usize,
    mode: FetchMode,
}

impl FetchRequest {
    /// Build a request, rejecting URLs that are empty after trimming.
    pub fn new(url: &str, size_budget: usize, mode: FetchMode) -> Result<Self, Error> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::InvalidInput("url cannot be empty".into()));
        }

        Ok(Self { url: url.to_string(), size_budget, mode })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Maximum content length in chars.
    pub fn size_budget(&self) -> usize {
        self.size_budget
    }

    pub fn mode(&self) -> FetchMode {
        self.mode
    }
}

/// The tier that produced an acquisition's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TierUsed {
    Render,
    LightweightHttp,
    /// No tier produced content.
    None,
}

/// How a single tier attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Succeeded,
    /// The tier answered but normalization left no text.
    Empty,
    Failed(String),
}

/// One entry of the per-request attempt log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TierAttempt {
    pub tier: TierUsed,
    pub outcome: AttemptOutcome,
}

/// Outcome of running the acquisition pipeline for one URL.
///
/// Always produced for a valid [`FetchRequest`]. Total failure is the
/// degraded value: `tier_used == TierUsed::None` with empty content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AcquisitionResult {
    pub url: String,
    /// Page title, or the URL when the page has none.
    pub title: String,
    /// Normalized text, at most `size_budget` chars.
    pub content: String,
    pub tier_used: TierUsed,
    /// Whether the text was cut to fit the budget.
    pub truncated: bool,
    /// Tiers attempted, in order.
    pub attempts: Vec<TierAttempt>,
}

impl AcquisitionResult {
    /// Whether no tier produced content.
    pub fn is_degraded(&self) -> bool {
        self.tier_used == TierUsed::None
    }
}

/// A ranked search result as seen by the enrichment flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
    /// Starts as the snippet; replaced with page text when enrichment succeeds.
    pub content: String,
}

impl SearchHit {
    pub fn new(title: impl Into<String>, url: impl Into<String>, snippet: impl Into<String>) -> Self {
        let snippet = snippet.into();
        Self { title: title.into(), url: url.into(), content: snippet.clone(), snippet }
    }
}
