//! Turning HTML into bounded, readable text.
//!
//! - [`normalize`]: noise-stripped plain text with a hard char cap, applied to
//!   whatever HTML a tier produced.
//! - [`content`]: content-area filtering into markdown-like text, applied to
//!   rendered DOM snapshots.
//! - [`title`]: page title with URL fallback.

pub mod content;
pub mod normalize;
pub mod title;

pub use content::ContentFilter;
pub use normalize::{
    Normalized, clean_text, collapse_blank_lines, looks_like_html, normalize, normalize_bounded, tidy_text, truncate_chars,
};
pub use title::{page_title, resolve_title};

/// Elements that start and end their own line of text.
const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "blockquote",
    "body",
    "caption",
    "dd",
    "details",
    "dialog",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "hr",
    "html",
    "li",
    "main",
    "ol",
    "p",
    "pre",
    "section",
    "summary",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "tr",
    "ul",
];

pub(crate) fn is_block_element(name: &str) -> bool {
    BLOCK_TAGS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_classification() {
        assert!(is_block_element("p"));
        assert!(is_block_element("li"));
        assert!(is_block_element("h3"));
        assert!(!is_block_element("span"));
        assert!(!is_block_element("a"));
        assert!(!is_block_element("b"));
    }
}
