//! web_search tool implementation.
//!
//! Searches the web and replaces the snippet-only content of the top results
//! with page text from the acquisition pipeline.

use pagesift_client::enrich_hits;
use pagesift_core::{Error, FetchMode, SearchHit};
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::tool_error;
use crate::handler::AppState;

/// Upper bound on `max_results`.
const MAX_RESULTS_LIMIT: usize = 20;

/// Input parameters for web_search tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct WebSearchParams {
    /// Search query (required).
    pub query: String,

    /// Number of results (1-20, default from configuration).
    #[serde(default)]
    pub max_results: Option<usize>,
}

/// Output structure for web_search tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WebSearchOutput {
    pub query: String,
    /// Results in rank order.
    pub results: Vec<SearchHit>,
}

pub async fn search_impl(state: &AppState, params: WebSearchParams) -> Result<CallToolResult, McpError> {
    let query = params.query.trim();
    if query.is_empty() {
        return Err(tool_error("web_search", Error::InvalidInput("query cannot be empty".into())));
    }

    let max_results = params
        .max_results
        .unwrap_or(state.config.search_max_results)
        .clamp(1, MAX_RESULTS_LIMIT);

    let mut results = state
        .search
        .search(query, max_results)
        .await
        .map_err(|e| tool_error("web_search", Error::SearchFailed(format!("{} search failed: {e}", state.search.name()))))?;

    enrich_hits(
        &state.acquirer,
        &mut results,
        state.config.enrich_limit,
        state.config.budget(FetchMode::Enrichment),
    )
    .await;

    let output = WebSearchOutput { query: query.to_string(), results };

    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(&output).unwrap_or_default(),
    )]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{StaticSearch, state_with_search, state_without_network};
    use pagesift_client::SearchError;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn output_of(result: &CallToolResult) -> WebSearchOutput {
        let text = result.content[0].as_text().map(|t| t.text.clone()).unwrap_or_default();
        serde_json::from_str(&text).unwrap()
    }

    #[tokio::test]
    async fn test_search_empty_query() {
        let state = state_without_network();
        let err = search_impl(&state, WebSearchParams { query: " ".into(), max_results: None }).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }

    #[tokio::test]
    async fn test_search_backend_failure() {
        let state = state_with_search(StaticSearch(Err(SearchError::HttpError { status: 429 })));
        let err = search_impl(&state, WebSearchParams { query: "rust".into(), max_results: None }).await.unwrap_err();

        assert_eq!(err.code.0, -32009);
        assert!(err.message.contains("HTTP error: 429"));
    }

    #[tokio::test]
    async fn test_search_enriches_top_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>Page text</p>"))
            .mount(&server)
            .await;

        let hits: Vec<SearchHit> = (0..5)
            .map(|i| SearchHit::new(format!("Hit {i}"), format!("{}/{i}", server.uri()), format!("snippet {i}")))
            .collect();
        let state = state_with_search(StaticSearch(Ok(hits)));

        let result = search_impl(&state, WebSearchParams { query: "rust".into(), max_results: None }).await.unwrap();
        let output = output_of(&result);

        assert_eq!(output.query, "rust");
        assert_eq!(output.results.len(), 5);
        assert_eq!(output.results[0].content, "Page text");
        assert_eq!(output.results[1].content, "Page text");
        assert_eq!(output.results[2].content, "snippet 2");
        assert_eq!(output.results[4].content, "snippet 4");
        assert_eq!(output.results[0].snippet, "snippet 0");
    }

    #[tokio::test]
    async fn test_search_failed_enrichment_keeps_snippets() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).and(path("/0")).respond_with(ResponseTemplate::new(404)).mount(&server).await;

        let hits = vec![SearchHit::new("Hit", format!("{}/0", server.uri()), "only snippet")];
        let state = state_with_search(StaticSearch(Ok(hits)));

        let result =
            search_impl(&state, WebSearchParams { query: "rust".into(), max_results: Some(3) }).await.unwrap();
        assert_eq!(output_of(&result).results[0].content, "only snippet");
    }

    #[tokio::test]
    async fn test_search_max_results_clamped() {
        let hits: Vec<SearchHit> =
            (0..30).map(|i| SearchHit::new(format!("Hit {i}"), "", format!("snippet {i}"))).collect();
        let state = state_with_search(StaticSearch(Ok(hits)));

        let result =
            search_impl(&state, WebSearchParams { query: "rust".into(), max_results: Some(100) }).await.unwrap();
        assert_eq!(output_of(&result).results.len(), MAX_RESULTS_LIMIT);
    }
}
