//! Canonical URL hint extraction.
//!
//! Looks for the URL a landing page declares as its own address, in priority
//! order:
//! 1. `<link rel="canonical" href="...">`
//! 2. `<meta property="og:url" content="...">`

use scraper::{Html, Selector};
use std::sync::LazyLock;

// CSS selector strings
const CANONICAL_LINK_SELECTOR_STR: &str = r#"link[rel="canonical"]"#;
const OG_URL_SELECTOR_STR: &str = r#"meta[property="og:url"]"#;

static CANONICAL_LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    crate::utils::parse_selector_with_fallback(CANONICAL_LINK_SELECTOR_STR, "canonical link")
});

static OG_URL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| crate::utils::parse_selector_with_fallback(OG_URL_SELECTOR_STR, "og:url meta"));

/// Extracts the canonical URL hint from an HTML document.
///
/// Only the first `<link rel="canonical">` is considered; if it has no `href`
/// the `og:url` meta tag is used instead. Returns `None` when neither is present.
pub fn extract_canonical_hint(document: &Html) -> Option<String> {
    let from_link = document
        .select(&CANONICAL_LINK_SELECTOR)
        .next()
        .and_then(|element| element.value().attr("href"));

    let hint = from_link.or_else(|| {
        document
            .select(&OG_URL_SELECTOR)
            .next()
            .and_then(|element| element.value().attr("content"))
    });

    log::debug!("Canonical hint: {hint:?}");
    hint.map(str::to_string)
}

/// Parses `body` as HTML and extracts the canonical URL hint.
///
/// `scraper::Html` is not `Send`, so the document is parsed and dropped here
/// rather than held across an await point.
pub fn canonical_hint_from_body(body: &str) -> Option<String> {
    let document = Html::parse_document(body);
    extract_canonical_hint(&document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_link() {
        let body = r#"<html><head>
            <link rel="canonical" href="https://journals.plos.org/plosone/article?id=10.1371/journal.pone.0000001">
            <meta property="og:url" content="https://example.org/other">
        </head><body></body></html>"#;
        assert_eq!(
            canonical_hint_from_body(body).as_deref(),
            Some("https://journals.plos.org/plosone/article?id=10.1371/journal.pone.0000001")
        );
    }

    #[test]
    fn test_og_url_fallback() {
        let body = r#"<html><head><meta property="og:url" content="https://example.org/10.1/x"></head></html>"#;
        assert_eq!(
            canonical_hint_from_body(body).as_deref(),
            Some("https://example.org/10.1/x")
        );
    }

    #[test]
    fn test_canonical_link_without_href_falls_back_to_og_url() {
        let body = r#"<html><head>
            <link rel="canonical">
            <meta property="og:url" content="https://example.org/10.1/x">
        </head></html>"#;
        assert_eq!(
            canonical_hint_from_body(body).as_deref(),
            Some("https://example.org/10.1/x")
        );
    }

    #[test]
    fn test_first_canonical_link_wins() {
        let body = r#"<html><head>
            <link rel="canonical" href="/first/1">
            <link rel="canonical" href="/second/2">
        </head></html>"#;
        assert_eq!(canonical_hint_from_body(body).as_deref(), Some("/first/1"));
    }

    #[test]
    fn test_no_hint() {
        let body = "<html><head><title>Article 10.1/x</title></head><body>hello</body></html>";
        assert_eq!(canonical_hint_from_body(body), None);
        assert_eq!(canonical_hint_from_body(""), None);
        assert_eq!(canonical_hint_from_body(r#"{"json":true}"#), None);
    }

    #[test]
    fn test_other_link_rels_are_ignored() {
        let body = r#"<html><head><link rel="alternate" href="https://example.org/feed"></head></html>"#;
        assert_eq!(canonical_hint_from_body(body), None);
    }
}
