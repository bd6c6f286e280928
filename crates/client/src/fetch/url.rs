//! URL canonicalization applied before any tier touches a URL.

use url::Url;

/// Why a URL string could not be used by a tier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("URL has no host: {0}")]
    MissingHost(String),

    #[error("invalid URL: {0}")]
    Invalid(String),
}

/// Canonicalize a caller-supplied URL.
///
/// Whitespace is trimmed, a bare `host/path` gets `https://`, only http(s)
/// is accepted, and the fragment is dropped since it never reaches the
/// server. Host lowercasing is done by the `url` parser.
pub fn canonicalize(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut url = match Url::parse(trimmed) {
        Ok(url) if url.cannot_be_a_base() && !trimmed.contains("://") => {
            return Err(UrlError::UnsupportedScheme(url.scheme().to_string()));
        }
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{trimmed}")).map_err(|e| UrlError::Invalid(e.to_string()))?
        }
        Err(e) => return Err(UrlError::Invalid(e.to_string())),
    };

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlError::UnsupportedScheme(url.scheme().to_string()));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlError::MissingHost(trimmed.to_string()));
    }

    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_keeps_https_url() {
        let url = canonicalize("https://example.com/a?b=1").unwrap();
        assert_eq!(url.as_str(), "https://example.com/a?b=1");
    }

    #[test]
    fn test_canonicalize_bare_host_gets_https() {
        let url = canonicalize("example.com/docs").unwrap();
        assert_eq!(url.as_str(), "https://example.com/docs");
    }

    #[test]
    fn test_canonicalize_lowercases_host_and_drops_fragment() {
        let url = canonicalize("  HTTP://Example.COM/Path#section ").unwrap();
        assert_eq!(url.as_str(), "http://example.com/Path");
    }

    #[test]
    fn test_canonicalize_rejects_other_schemes() {
        assert!(matches!(canonicalize("file:///etc/passwd"), Err(UrlError::UnsupportedScheme(s)) if s == "file"));
        assert!(matches!(canonicalize("mailto:someone@example.com"), Err(UrlError::UnsupportedScheme(_))));
        assert!(matches!(canonicalize("javascript:alert(1)"), Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_canonicalize_empty() {
        assert_eq!(canonicalize(""), Err(UrlError::Empty));
        assert_eq!(canonicalize("   "), Err(UrlError::Empty));
    }

    #[test]
    fn test_canonicalize_garbage() {
        assert!(canonicalize("http://").is_err());
        assert!(canonicalize("https://exa mple.com").is_err());
    }
}
