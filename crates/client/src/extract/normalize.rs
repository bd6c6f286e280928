//! HTML to plain text normalization.
//!
//! Lengths are measured in Unicode scalar values (`char`s), never bytes, so
//! a cut can not split a code point.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html};

use super::is_block_element;

/// Elements whose subtree never contributes text.
const NOISE_TAGS: &[&str] = &["script", "style", "nav", "footer", "header", "aside", "head", "noscript", "template"];

/// Deeper subtrees are ignored rather than risking the stack.
const MAX_DEPTH: usize = 512;

static BLANK_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("static regex"));

/// Markers that only appear in markup: a doctype, a comment, or a document
/// skeleton tag.
static DOCUMENT_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<!doctype|<!--|<(?:html|head|body)[\s>/]").expect("static regex")
});

static CLOSING_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</([A-Za-z][A-Za-z0-9-]*)\s*>").expect("static regex"));

/// Text with its truncation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    /// Whether the text was longer than the cap before cutting.
    pub truncated: bool,
}

/// Convert HTML to clean text of at most `cap` chars.
pub fn normalize(html: &str, cap: usize) -> String {
    normalize_bounded(html, cap).text
}

/// Like [`normalize`], also reporting whether the cap cut anything.
pub fn normalize_bounded(html: &str, cap: usize) -> Normalized {
    truncate_chars(&clean_text(html), cap)
}

/// Convert HTML to clean text without a length cap.
///
/// Returns an empty string for blank or binary input. Input is parsed as HTML
/// only when it has document structure (see [`looks_like_html`]); anything
/// else is tidied as plain text. Decoded text such as `a<b` or `a <div> tag`
/// therefore survives a second pass unchanged.
pub fn clean_text(html: &str) -> String {
    if html.trim().is_empty() || html.contains('\0') {
        return String::new();
    }

    if !looks_like_html(html) {
        return tidy_lines(html);
    }

    let document = Html::parse_document(html);
    let mut out = String::new();
    collect_text(document.root_element(), &mut out, false, 0);

    tidy_lines(&out)
}

/// Cut `text` to at most `cap` chars. Trailing whitespace left by the cut is
/// dropped.
pub fn truncate_chars(text: &str, cap: usize) -> Normalized {
    match text.char_indices().nth(cap) {
        Some((idx, _)) => Normalized { text: text[..idx].trim_end().to_string(), truncated: true },
        None => Normalized { text: text.to_string(), truncated: false },
    }
}

/// Plain-text cleanup: per-line whitespace collapsing and blank-run
/// squeezing, with no HTML parsing. Blank or binary input gives `""`.
pub fn tidy_text(text: &str) -> String {
    if text.contains('\0') {
        return String::new();
    }
    tidy_lines(text)
}

/// Whether `input` has HTML document structure.
///
/// True for a doctype, a comment or an `html`/`head`/`body` tag, or for a
/// closing tag `</x>` preceded by a matching `<x` opener. A lone `<div>` or
/// `a<b` in running text is not enough.
pub fn looks_like_html(input: &str) -> bool {
    if DOCUMENT_MARKER.is_match(input) {
        return true;
    }

    let lower = input.to_ascii_lowercase();
    CLOSING_TAG.captures_iter(&lower).any(|caps| {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            return false;
        };
        let opener = format!("<{}", name.as_str());
        lower[..whole.start()].match_indices(&opener).any(|(idx, _)| {
            lower[idx + opener.len()..]
                .chars()
                .next()
                .is_some_and(|c| c == '>' || c == '/' || c.is_whitespace())
        })
    })
}

/// Collapse runs of three or more newlines to a single blank line.
pub fn collapse_blank_lines(text: &str) -> String {
    BLANK_RUNS.replace_all(text, "\n\n").into_owned()
}

fn collect_text(element: ElementRef<'_>, out: &mut String, preformatted: bool, depth: usize) {
    if depth > MAX_DEPTH {
        return;
    }

    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            push_text(out, text, preformatted);
            continue;
        }

        let Some(child_el) = ElementRef::wrap(child) else {
            continue;
        };

        let name = child_el.value().name();
        if NOISE_TAGS.contains(&name) {
            continue;
        }
        if name == "br" {
            end_line(out);
            out.push('\n');
            continue;
        }

        let block = is_block_element(name);
        if block {
            end_line(out);
        }
        collect_text(child_el, out, preformatted || name == "pre", depth + 1);
        if block {
            end_line(out);
        }
    }
}

fn push_text(out: &mut String, text: &str, preformatted: bool) {
    if preformatted {
        out.push_str(text);
        return;
    }

    let at_line_start = out.is_empty() || out.ends_with('\n');
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        if !at_line_start && !out.ends_with(' ') {
            out.push(' ');
        }
        return;
    }

    let leading = text.starts_with(char::is_whitespace);
    if leading && !at_line_start && !out.ends_with(' ') {
        out.push(' ');
    }
    out.push_str(&collapsed);
    if text.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}

fn end_line(out: &mut String) {
    while out.ends_with(' ') {
        out.pop();
    }
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Collapse horizontal whitespace per line, trim lines, then squeeze blank runs.
fn tidy_lines(text: &str) -> String {
    let lines = text
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n");

    collapse_blank_lines(&lines).trim().to_string()
}
