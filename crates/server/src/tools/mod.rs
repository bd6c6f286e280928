//! MCP tool implementations.

pub mod web_fetch;
pub mod web_search;

use pagesift_core::Error;
use rmcp::ErrorData as McpError;

/// Log a tool failure at a level matching whose fault it is, then convert it
/// for the MCP response.
pub(crate) fn tool_error(tool: &str, err: Error) -> McpError {
    if err.is_client_error() {
        tracing::debug!(tool, "rejected tool call: {err}");
    } else {
        tracing::warn!(tool, "tool call failed: {err}");
    }
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_keeps_codes() {
        assert_eq!(tool_error("web_fetch", Error::InvalidInput("url cannot be empty".into())).code.0, -32602);
        assert_eq!(tool_error("web_fetch", Error::FetchFailed("nothing".into())).code.0, -32008);
        assert_eq!(tool_error("web_search", Error::SearchFailed("down".into())).code.0, -32009);
    }
}
