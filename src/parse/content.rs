//! Response body content sniffing.
//!
//! The `Content-Type` header is not a reliable guide to what a server actually
//! sent, so bodies are classified by trying each parser in order: structured
//! data (JSON) first, then markup (XML), then falling back to opaque text.

use serde_json::Value;
use strum_macros::Display;
use thiserror::Error;

use super::markup::{parse_markup, MarkupDocument, MarkupError};

/// The three shapes a body can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ContentKind {
    Structured,
    Markup,
    Opaque,
}

/// A classified response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Parsed JSON value.
    Structured(Value),
    /// Parsed, well-formed XML document.
    Markup(MarkupDocument),
    /// The body as received.
    Opaque(String),
}

impl Content {
    pub fn kind(&self) -> ContentKind {
        match self {
            Content::Structured(_) => ContentKind::Structured,
            Content::Markup(_) => ContentKind::Markup,
            Content::Opaque(_) => ContentKind::Opaque,
        }
    }

    /// The `error` field of a structured or markup body, rendered as a string.
    ///
    /// A JSON `null` counts as absent. Non-string JSON values are rendered as JSON.
    pub fn error_field(&self) -> Option<String> {
        match self {
            Content::Structured(Value::Object(map)) => match map.get("error") {
                None | Some(Value::Null) => None,
                Some(Value::String(message)) => Some(message.clone()),
                Some(other) => Some(other.to_string()),
            },
            Content::Structured(_) => None,
            Content::Markup(document) => document.error_field(),
            Content::Opaque(_) => None,
        }
    }
}

/// Why one parser attempt did not match.
#[derive(Error, Debug)]
enum SniffError {
    #[error("not structured data: {0}")]
    Structured(#[from] serde_json::Error),

    #[error("not markup: {0}")]
    Markup(#[from] MarkupError),
}

type ParserAttempt = fn(&str) -> Result<Content, SniffError>;

/// Parsers tried in order; the first success wins.
const PARSER_ATTEMPTS: [ParserAttempt; 2] = [try_structured, try_markup];

fn try_structured(body: &str) -> Result<Content, SniffError> {
    Ok(Content::Structured(serde_json::from_str(body)?))
}

fn try_markup(body: &str) -> Result<Content, SniffError> {
    Ok(Content::Markup(parse_markup(body)?))
}

/// Classifies a body as structured data, markup or opaque text. Never fails.
pub fn sniff(body: &str) -> Content {
    for attempt in PARSER_ATTEMPTS {
        match attempt(body) {
            Ok(content) => return content,
            Err(e) => log::trace!("{e}"),
        }
    }
    Content::Opaque(body.to_string())
}
