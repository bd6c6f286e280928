//! Content acquisition for pagesift.
//!
//! Tiers (headless render, lightweight HTTP), the HTML normalizer and title
//! resolver, the fallback orchestrator that ties them together, and the
//! search collaborator used by the enrichment flow.

pub mod acquire;
pub mod enrich;
pub mod extract;
pub mod fetch;
pub mod render;
pub mod search;

#[cfg(test)]
mod testing;

pub use acquire::{Acquirer, TierConfig};
pub use enrich::enrich_hits;
pub use extract::{
    ContentFilter, Normalized, clean_text, normalize, normalize_bounded, resolve_title, tidy_text, truncate_chars,
};
pub use fetch::{FetchClient, FetchConfig, FetchError, PageFetcher, RawFetchOutcome};
pub use render::{PageRenderer, RenderConfig, RenderOutcome, start_renderer};
pub use search::{DuckDuckGoClient, DuckDuckGoConfig, SearchError, SearchProvider};
