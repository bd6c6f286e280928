//! Unified error types for pagesift.
//!
//! Only errors that a caller can act on live here. Tier-local failures are
//! recovered inside the acquisition pipeline and never reach this type.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Caller-visible errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty URL or query).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// No tier produced content for a direct fetch.
    #[error("FETCH_FAILED: {0}")]
    FetchFailed(String),

    /// The search collaborator failed.
    #[error("SEARCH_FAILED: {0}")]
    SearchFailed(String),
}

impl Error {
    /// Whether the error is the caller's fault (a client error).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::FetchFailed(msg) => (-32008, msg.clone()),
            Error::SearchFailed(msg) => (-32009, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
