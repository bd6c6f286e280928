//! web_fetch tool implementation.
//!
//! Direct fetch of one URL through the tiered pipeline, bounded by the
//! direct-fetch budget.

use chrono::Utc;
use pagesift_core::{AttemptOutcome, Error, FetchMode, FetchRequest, TierAttempt, TierUsed};
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::tool_error;
use crate::handler::AppState;

/// Input parameters for web_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WebFetchParams {
    /// The URL to fetch. A missing scheme defaults to https.
    pub url: String,
}

/// Output structure for web_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WebFetchOutput {
    pub url: String,
    /// Page title, or the URL when the page has none.
    pub title: String,
    /// Normalized page text.
    pub content: String,
    /// Tier that produced the content.
    pub tier: TierUsed,
    /// Whether the content was cut to fit the size budget.
    pub truncated: bool,
    /// ISO8601 timestamp of when the content was fetched.
    pub fetched_at: String,
    /// Tiers attempted, in order.
    pub attempts: Vec<TierAttempt>,
}

pub async fn fetch_impl(state: &AppState, params: WebFetchParams) -> Result<CallToolResult, McpError> {
    let budget = state.config.budget(FetchMode::DirectFetch);
    let request =
        FetchRequest::new(&params.url, budget, FetchMode::DirectFetch).map_err(|e| tool_error("web_fetch", e))?;

    let result = state.acquirer.acquire(&request).await;
    if result.is_degraded() {
        let err = Error::FetchFailed(failure_summary(&result.url, &result.attempts));
        return Err(tool_error("web_fetch", err));
    }

    let output = WebFetchOutput {
        url: result.url,
        title: result.title,
        content: result.content,
        tier: result.tier_used,
        truncated: result.truncated,
        fetched_at: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        attempts: result.attempts,
    };

    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(&output).unwrap_or_default(),
    )]))
}

/// One line naming every tier that was tried and why it gave nothing.
fn failure_summary(url: &str, attempts: &[TierAttempt]) -> String {
    let reasons: Vec<String> = attempts
        .iter()
        .map(|a| {
            let tier = match a.tier {
                TierUsed::Render => "render",
                TierUsed::LightweightHttp => "http",
                TierUsed::None => "none",
            };
            match &a.outcome {
                AttemptOutcome::Failed(reason) => format!("{tier}: {reason}"),
                AttemptOutcome::Empty => format!("{tier}: no content"),
                AttemptOutcome::Succeeded => format!("{tier}: ok"),
            }
        })
        .collect();

    format!("could not fetch content from {url} ({})", reasons.join("; "))
}
