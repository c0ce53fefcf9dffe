//! Owned, read-only HTML document tree and the queries run over it.
//!
//! This crate provides:
//! - [`Node`] — a closed two-case tree (elements and text)
//! - [`parse`] — conversion from `scraper`'s parsed HTML into [`Node`]
//! - [`query`] — tag search, text extraction, and parent lookup

pub mod parse;
pub mod query;

pub use parse::{load_document, parse_document, parse_fragment};
pub use query::{Descendants, descendants, extract_text, find_by_tag_name, find_parent};

/// Tag name reported for text nodes.
pub const TEXT_TAG: &str = "#text";

/// Tag name of the synthetic document root.
pub const DOCUMENT_TAG: &str = "#document";

/// Tag name of the synthetic fragment root.
pub const FRAGMENT_TAG: &str = "#document-fragment";

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A node of the document tree.
///
/// Each node has exactly one owner; the tree is finite and never mutated after
/// parsing. Queries compare nodes by address, not by structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An element with its attributes and children.
    Element(Element),
    /// A run of character data.
    Text(String),
}

/// An element node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lower-case local name (`"table"`, `"a"`, ...).
    pub tag: String,
    /// Attribute `(name, value)` pairs in parser order.
    pub attrs: Vec<(String, String)>,
    /// Child nodes in document order.
    pub children: Vec<Node>,
}

impl Element {
    /// Value of the first attribute called `name`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl Node {
    /// Build an element node.
    pub fn element(tag: impl Into<String>, attrs: Vec<(String, String)>, children: Vec<Node>) -> Self {
        Self::Element(Element {
            tag: tag.into(),
            attrs,
            children,
        })
    }

    /// Build a text node.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// The element's tag, or [`TEXT_TAG`] for text.
    pub fn tag_name(&self) -> &str {
        match self {
            Self::Element(el) => &el.tag,
            Self::Text(_) => TEXT_TAG,
        }
    }

    /// Children in document order; always empty for text.
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Element(el) => &el.children,
            Self::Text(_) => &[],
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            Self::Text(_) => None,
        }
    }

    /// Whether this is an element called `tag`.
    pub fn is_element(&self, tag: &str) -> bool {
        matches!(self, Self::Element(el) if el.tag == tag)
    }

    /// Attribute lookup; `None` for text nodes.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.as_element().and_then(|el| el.attr(name))
    }
}
