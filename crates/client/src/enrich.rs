//! Search-result enrichment.

use pagesift_core::{FetchMode, FetchRequest, SearchHit};

use crate::acquire::Acquirer;

/// Replace the content of the first `limit` hits with page text.
///
/// Hits are processed one at a time in rank order. A hit keeps its snippet
/// when its URL is unusable or when acquisition comes back degraded. Hits past
/// `limit` are never touched. Returns the number of hits whose content was
/// replaced.
pub async fn enrich_hits(acquirer: &Acquirer, hits: &mut [SearchHit], limit: usize, budget: usize) -> usize {
    let mut enriched = 0;

    for hit in hits.iter_mut().take(limit) {
        let request = match FetchRequest::new(&hit.url, budget, FetchMode::Enrichment) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!("skipping enrichment for {:?}: {}", hit.title, e);
                continue;
            }
        };

        let result = acquirer.acquire(&request).await;
        if result.is_degraded() {
            tracing::debug!(url = %hit.url, "enrichment degraded, keeping snippet");
            continue;
        }

        hit.content = result.content;
        enriched += 1;
    }

    tracing::info!(enriched, candidates = limit.min(hits.len()), "search results enriched");
    enriched
}
