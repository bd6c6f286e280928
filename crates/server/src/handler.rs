//! MCP server handler implementation.
//!
//! Holds the process-wide acquisition state and routes tool calls to the
//! implementations in [`crate::tools`].

use std::sync::Arc;

use pagesift_client::{Acquirer, DuckDuckGoClient, DuckDuckGoConfig, SearchProvider};
use pagesift_core::AppConfig;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

use crate::tools::web_fetch::{WebFetchParams, fetch_impl};
use crate::tools::web_search::{WebSearchParams, search_impl};

/// Everything a tool call needs, built once at startup.
pub struct AppState {
    pub config: AppConfig,
    pub acquirer: Acquirer,
    pub search: Arc<dyn SearchProvider>,
}

impl AppState {
    pub fn new(config: AppConfig, acquirer: Acquirer, search: Arc<dyn SearchProvider>) -> Self {
        Self { config, acquirer, search }
    }

    /// Build the production tiers and search client. Resolves render
    /// availability once for the lifetime of the process.
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let acquirer = Acquirer::from_config(&config).await?;
        let search = DuckDuckGoClient::new(DuckDuckGoConfig::from_app(&config))?;

        Ok(Self::new(config, acquirer, Arc::new(search)))
    }
}

/// The main MCP server handler for pagesift.
#[derive(Clone)]
pub struct PagesiftServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl PagesiftServer {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state, tool_router: Self::tool_router() }
    }

    /// Search the web and enrich the top results with page text.
    #[tool(
        description = "Search the web. Returns ranked results with title, url and snippet; the top results also carry the page text in `content`."
    )]
    async fn web_search(&self, params: Parameters<WebSearchParams>) -> Result<CallToolResult, McpError> {
        search_impl(&self.state, params.0).await
    }

    /// Fetch one URL with the full tier fallback.
    #[tool(
        description = "Fetch a URL and return its readable text. Renders JavaScript when a browser is available and falls back to a plain HTTP fetch."
    )]
    async fn web_fetch(&self, params: Parameters<WebFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.state, params.0).await
    }
}

impl ServerHandler for PagesiftServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "pagesift".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
