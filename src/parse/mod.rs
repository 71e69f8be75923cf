//! Response body parsing.
//!
//! This module provides:
//! - Content sniffing (structured data, markup, opaque text)
//! - Strict markup parsing into a small element tree (`quick-xml`)
//! - Canonical URL hint extraction from HTML (`scraper` CSS selectors)

mod content;
mod html;
mod markup;

// Re-export public API
pub use content::{sniff, Content, ContentKind};
pub use html::{canonical_hint_from_body, extract_canonical_hint};
pub use markup::{parse_markup, MarkupDocument, MarkupElement, MarkupError};
