//! Strict markup (XML) parsing.
//!
//! Builds a small element tree with `quick-xml`. Any syntax problem, a missing
//! root element, a second root, text outside the root or an unclosed element
//! is an error: the content sniffer only accepts well-formed documents.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use thiserror::Error;

/// Why a body is not well-formed markup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    #[error("markup syntax error: {0}")]
    Syntax(String),

    #[error("document has no root element")]
    NoRoot,

    #[error("document has more than one root element")]
    MultipleRoots,

    #[error("text outside the root element")]
    TextOutsideRoot,

    #[error("element <{0}> is never closed")]
    Unclosed(String),

    #[error("closing tag without an open element")]
    UnexpectedEnd,
}

/// An element of a parsed markup document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkupElement {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MarkupElement>,
}

impl MarkupElement {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, MarkupError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| MarkupError::Syntax(e.to_string()))?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(|e| MarkupError::Syntax(e.to_string()))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            text: String::new(),
            children: Vec::new(),
        })
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&MarkupElement> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Value of the named attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Text content with surrounding whitespace removed.
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }
}

/// A well-formed markup document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkupDocument {
    pub root: MarkupElement,
}

impl MarkupDocument {
    /// The document's `error` field: the text of an `<error>` root element, or
    /// of an `<error>` child of the root.
    pub fn error_field(&self) -> Option<String> {
        let element = if self.root.name == "error" {
            Some(&self.root)
        } else {
            self.root.child("error")
        }?;
        let text = element.trimmed_text();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Parses `input` as a well-formed markup document.
pub fn parse_markup(input: &str) -> Result<MarkupDocument, MarkupError> {
    let mut reader = Reader::from_str(input);
    let mut open: Vec<MarkupElement> = Vec::new();
    let mut root: Option<MarkupElement> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| MarkupError::Syntax(e.to_string()))?;
        match event {
            Event::Start(start) => {
                if open.is_empty() && root.is_some() {
                    return Err(MarkupError::MultipleRoots);
                }
                open.push(MarkupElement::from_start(&start)?);
            }
            Event::Empty(start) => {
                if open.is_empty() && root.is_some() {
                    return Err(MarkupError::MultipleRoots);
                }
                let element = MarkupElement::from_start(&start)?;
                close_element(element, &mut open, &mut root);
            }
            Event::End(_) => {
                let element = open.pop().ok_or(MarkupError::UnexpectedEnd)?;
                close_element(element, &mut open, &mut root);
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| MarkupError::Syntax(e.to_string()))?;
                append_text(&mut open, text)?;
            }
            Event::CData(data) => {
                append_text(&mut open, String::from_utf8_lossy(&data))?;
            }
            Event::Eof => break,
            // declarations, comments, processing instructions, doctypes
            _ => {}
        }
    }

    if let Some(element) = open.last() {
        return Err(MarkupError::Unclosed(element.name.clone()));
    }
    root.map(|root| MarkupDocument { root })
        .ok_or(MarkupError::NoRoot)
}

fn close_element(
    element: MarkupElement,
    open: &mut [MarkupElement],
    root: &mut Option<MarkupElement>,
) {
    match open.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

fn append_text(open: &mut [MarkupElement], text: Cow<'_, str>) -> Result<(), MarkupError> {
    match open.last_mut() {
        Some(element) => {
            element.text.push_str(&text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(MarkupError::TextOutsideRoot),
    }
}
