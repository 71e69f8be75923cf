//! CSS selector parsing.

use scraper::Selector;

/// Parses a static CSS selector, falling back to one that matches nothing.
///
/// A selector that fails to parse is a programming error, but extraction
/// should degrade to "no match" instead of panicking mid-request.
///
/// # Arguments
///
/// * `selector_str` - The CSS selector string to parse
/// * `context` - What the selector is for, used in the error log
pub fn parse_selector_with_fallback(selector_str: &str, context: &str) -> Selector {
    Selector::parse(selector_str).unwrap_or_else(|e| {
        log::error!("Failed to parse CSS selector '{selector_str}' for {context}: {e}");
        Selector::parse("*:not(*)").unwrap_or_else(|_| unreachable!("'*:not(*)' is a valid selector"))
    })
}
