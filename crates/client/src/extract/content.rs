//! Content-area extraction for rendered pages.
//!
//! Walks a DOM snapshot and keeps the readable body of the page as
//! markdown-like text:
//! - `#` headings, `- ` list items, `> ` quotes and fenced `pre` blocks
//! - same-site links as `[text](url)`; off-site links are dropped entirely
//! - excluded tags (nav, footer, header, aside by default), overlays, hidden
//!   elements and embedded frames contribute nothing
//! - text blocks under the word-count threshold are dropped; headings and
//!   code blocks are exempt

use scraper::{ElementRef, Html};
use url::Url;

use super::is_block_element;

/// Never part of the content area, regardless of configuration.
const ALWAYS_SKIPPED: &[&str] = &[
    "script", "style", "noscript", "template", "head", "iframe", "frame", "frameset", "object", "embed", "svg",
    "canvas", "button", "input", "select", "textarea",
];

/// Class or id fragments that mark overlays such as cookie banners and modals.
const OVERLAY_MARKERS: &[&str] =
    &["modal", "popup", "overlay", "cookie", "consent", "newsletter", "lightbox", "paywall", "gdpr"];

const MAX_DEPTH: usize = 512;

/// Content-area heuristics applied to rendered HTML.
#[derive(Debug, Clone)]
pub struct ContentFilter {
    word_count_threshold: usize,
    excluded_tags: Vec<String>,
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::new(10, ["nav", "footer", "header", "aside"].iter().map(|t| t.to_string()).collect())
    }
}

impl ContentFilter {
    pub fn new(word_count_threshold: usize, excluded_tags: Vec<String>) -> Self {
        let excluded_tags = excluded_tags.into_iter().map(|t| t.trim().to_ascii_lowercase()).collect();
        Self { word_count_threshold, excluded_tags }
    }

    /// Extract the content area of `html` as markdown-like text.
    ///
    /// `page_url` decides which links are on-site and resolves relative ones.
    pub fn extract(&self, html: &str, page_url: &Url) -> String {
        if html.trim().is_empty() {
            return String::new();
        }

        let document = Html::parse_document(html);
        let mut walker = Walker {
            filter: self,
            page_url,
            blocks: Vec::new(),
            current: String::new(),
            words: 0,
            kind: BlockKind::Text,
        };
        walker.walk(document.root_element(), BlockKind::Text, 0);
        walker.flush();

        walker
            .blocks
            .iter()
            .filter(|b| b.kind.exempt_from_threshold() || b.words >= self.word_count_threshold)
            .map(Block::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn is_skipped(&self, el: ElementRef<'_>) -> bool {
        let value = el.value();
        let name = value.name();

        if ALWAYS_SKIPPED.contains(&name) || self.excluded_tags.iter().any(|t| t == name) {
            return true;
        }
        if value.attr("hidden").is_some() || value.attr("aria-hidden") == Some("true") {
            return true;
        }

        is_overlay(el)
    }
}

fn is_overlay(el: ElementRef<'_>) -> bool {
    let value = el.value();

    if matches!(value.attr("role"), Some("dialog" | "alertdialog")) || value.attr("aria-modal") == Some("true") {
        return true;
    }

    if let Some(style) = value.attr("style") {
        let style = style.to_ascii_lowercase().replace(' ', "");
        if style.contains("position:fixed") {
            return true;
        }
    }

    [value.attr("class"), value.attr("id")]
        .into_iter()
        .flatten()
        .map(str::to_ascii_lowercase)
        .any(|attr| OVERLAY_MARKERS.iter().any(|m| attr.contains(m)))
}

/// Hosts match when equal or one is a subdomain of the other, ignoring `www.`.
fn same_site(base: &Url, other: &Url) -> bool {
    let (Some(a), Some(b)) = (base.host_str(), other.host_str()) else {
        return false;
    };
    let a = a.trim_start_matches("www.");
    let b = b.trim_start_matches("www.");

    a == b || a.ends_with(&format!(".{b}")) || b.ends_with(&format!(".{a}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Heading(usize),
    ListItem,
    Quote,
    Code,
    Text,
}

impl BlockKind {
    fn for_element(name: &str, parent: BlockKind) -> BlockKind {
        match name {
            "h1" => BlockKind::Heading(1),
            "h2" => BlockKind::Heading(2),
            "h3" => BlockKind::Heading(3),
            "h4" => BlockKind::Heading(4),
            "h5" => BlockKind::Heading(5),
            "h6" => BlockKind::Heading(6),
            "li" => BlockKind::ListItem,
            "blockquote" => BlockKind::Quote,
            "pre" => BlockKind::Code,
            _ => parent,
        }
    }

    fn exempt_from_threshold(self) -> bool {
        matches!(self, BlockKind::Heading(_) | BlockKind::Code)
    }
}

#[derive(Debug)]
struct Block {
    kind: BlockKind,
    text: String,
    words: usize,
}

impl Block {
    fn render(&self) -> String {
        match self.kind {
            BlockKind::Heading(level) => format!("{} {}", "#".repeat(level), self.text),
            BlockKind::ListItem => format!("- {}", self.text),
            BlockKind::Quote => format!("> {}", self.text),
            BlockKind::Code => format!("```\n{}\n```", self.text),
            BlockKind::Text => self.text.clone(),
        }
    }
}

enum LinkTarget {
    Internal(Url),
    External,
    /// Fragments, mailto:, javascript: and unresolvable hrefs keep their text only.
    TextOnly,
}

struct Walker<'a> {
    filter: &'a ContentFilter,
    page_url: &'a Url,
    blocks: Vec<Block>,
    current: String,
    words: usize,
    kind: BlockKind,
}

impl Walker<'_> {
    fn walk(&mut self, element: ElementRef<'_>, kind: BlockKind, depth: usize) {
        if depth > MAX_DEPTH {
            return;
        }

        for child in element.children() {
            if let Some(text) = child.value().as_text() {
                self.push_text(text);
                continue;
            }

            let Some(child_el) = ElementRef::wrap(child) else {
                continue;
            };
            if self.filter.is_skipped(child_el) {
                continue;
            }

            match child_el.value().name() {
                "br" => self.current.push(if kind == BlockKind::Code { '\n' } else { ' ' }),
                "a" => self.push_link(child_el),
                name if is_block_element(name) => {
                    let child_kind = BlockKind::for_element(name, kind);
                    self.flush();
                    self.kind = child_kind;
                    self.walk(child_el, child_kind, depth + 1);
                    self.flush();
                    self.kind = kind;
                }
                _ => self.walk(child_el, kind, depth + 1),
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        if self.kind == BlockKind::Code {
            self.current.push_str(text);
            self.words += text.split_whitespace().count();
            return;
        }

        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let needs_gap = !self.current.is_empty() && !self.current.ends_with(' ');

        if collapsed.is_empty() {
            if needs_gap {
                self.current.push(' ');
            }
            return;
        }

        if needs_gap && text.starts_with(char::is_whitespace) {
            self.current.push(' ');
        }
        self.current.push_str(&collapsed);
        if text.ends_with(char::is_whitespace) {
            self.current.push(' ');
        }
        self.words += collapsed.split(' ').count();
    }

    fn push_link(&mut self, el: ElementRef<'_>) {
        let text = el.text().collect::<Vec<_>>().join(" ");
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

        match self.link_target(el.value().attr("href")) {
            LinkTarget::External => {}
            LinkTarget::Internal(_) | LinkTarget::TextOnly if text.is_empty() => {}
            LinkTarget::Internal(url) => {
                self.words += text.split(' ').count();
                self.current.push_str(&format!("[{text}]({url})"));
            }
            LinkTarget::TextOnly => {
                self.words += text.split(' ').count();
                self.current.push_str(&text);
            }
        }
    }

    fn link_target(&self, href: Option<&str>) -> LinkTarget {
        let Some(href) = href.map(str::trim).filter(|h| !h.is_empty() && !h.starts_with('#')) else {
            return LinkTarget::TextOnly;
        };

        match self.page_url.join(href) {
            Ok(url) if !matches!(url.scheme(), "http" | "https") => LinkTarget::TextOnly,
            Ok(url) if same_site(self.page_url, &url) => LinkTarget::Internal(url),
            Ok(_) => LinkTarget::External,
            Err(_) => LinkTarget::TextOnly,
        }
    }

    fn flush(&mut self) {
        let text = std::mem::take(&mut self.current);
        let words = std::mem::take(&mut self.words);

        let text = if self.kind == BlockKind::Code { text.trim_matches('\n').to_string() } else { text.trim().to_string() };
        if !text.trim().is_empty() {
            self.blocks.push(Block { kind: self.kind, text, words });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG: &str = "This paragraph has more than enough words to pass the threshold easily.";

    fn page() -> Url {
        Url::parse("https://www.example.com/start").unwrap()
    }

    #[test]
    fn test_drops_excluded_tags() {
        let html = format!(
            "<body><header>Brand</header><nav>Home About Contact</nav><main><p>{LONG}</p></main>\
             <aside>Sidebar</aside><footer>Copyright 2025</footer></body>"
        );
        assert_eq!(ContentFilter::default().extract(&html, &page()), LONG);
    }

    #[test]
    fn test_short_blocks_dropped_headings_kept() {
        let html = format!("<h2>Section</h2><p>Too short.</p><p>{LONG}</p>");
        assert_eq!(ContentFilter::default().extract(&html, &page()), format!("## Section\n\n{LONG}"));
    }

    #[test]
    fn test_zero_threshold_keeps_everything() {
        let filter = ContentFilter::new(0, vec![]);
        let html = "<ul><li>one</li><li>two</li></ul><blockquote>quoted</blockquote>";
        assert_eq!(filter.extract(html, &page()), "- one\n\n- two\n\n> quoted");
    }

    #[test]
    fn test_links_internal_kept_external_dropped() {
        let html = r#"<p>Read the <a href="/docs">documentation pages</a> and the <a href="https://other.org/x">partner site</a> for many more useful details today.</p>"#;
        let text = ContentFilter::default().extract(html, &page());
        assert_eq!(
            text,
            "Read the [documentation pages](https://www.example.com/docs) and the for many more useful details today."
        );
    }

    #[test]
    fn test_subdomain_links_are_internal() {
        let base = page();
        assert!(same_site(&base, &Url::parse("https://blog.example.com/post").unwrap()));
        assert!(same_site(&base, &Url::parse("http://example.com/").unwrap()));
        assert!(!same_site(&base, &Url::parse("https://notexample.com/").unwrap()));
        assert!(!same_site(&base, &Url::parse("https://example.org/").unwrap()));
    }

    #[test]
    fn test_mailto_and_fragment_links_keep_text() {
        let filter = ContentFilter::new(0, vec![]);
        let html = r##"<p><a href="#top">Back to top</a> or <a href="mailto:a@example.com">mail us</a></p>"##;
        assert_eq!(filter.extract(html, &page()), "Back to top or mail us");
    }

    #[test]
    fn test_overlays_dropped() {
        let html = format!(
            r#"<div class="cookie-banner"><p>{LONG}</p></div>
               <div role="dialog"><p>{LONG}</p></div>
               <div style="position: fixed; top: 0"><p>{LONG}</p></div>
               <div id="newsletter-popup"><p>{LONG}</p></div>
               <article><p>Kept: {LONG}</p></article>"#
        );
        assert_eq!(ContentFilter::default().extract(&html, &page()), format!("Kept: {LONG}"));
    }

    #[test]
    fn test_frames_and_hidden_elements_skipped() {
        let html = format!(
            r#"<iframe src="https://ads.example.net"></iframe><div hidden><p>{LONG}</p></div>
               <div aria-hidden="true"><p>{LONG}</p></div><p>Visible: {LONG}</p>"#
        );
        assert_eq!(ContentFilter::default().extract(&html, &page()), format!("Visible: {LONG}"));
    }

    #[test]
    fn test_code_blocks_fenced() {
        let html = "<pre><code>fn main() {\n    run();\n}</code></pre>";
        assert_eq!(ContentFilter::default().extract(html, &page()), "```\nfn main() {\n    run();\n}\n```");
    }

    #[test]
    fn test_custom_excluded_tags() {
        let filter = ContentFilter::new(0, vec!["Section".into()]);
        let html = "<section><p>gone</p></section><p>stays</p>";
        assert_eq!(filter.extract(html, &page()), "stays");
    }

    #[test]
    fn test_empty_html() {
        assert_eq!(ContentFilter::default().extract("", &page()), "");
    }
}
