//! Page title resolution.

use scraper::{Html, Selector};

/// Title of the page, or `fallback_url` when the HTML is missing, blank or
/// has no usable `<title>`.
pub fn resolve_title(html: Option<&str>, fallback_url: &str) -> String {
    html.filter(|h| !h.trim().is_empty())
        .and_then(page_title)
        .unwrap_or_else(|| fallback_url.to_string())
}

/// Whitespace-collapsed text of the first non-empty `<title>` element.
pub fn page_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;

    document
        .select(&selector)
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .find(|t| !t.is_empty())
}
