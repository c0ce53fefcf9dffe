//! Conversion from `scraper`'s parsed HTML into an owned [`Node`] tree.
//!
//! `scraper` (html5ever) does the actual parsing, including the usual HTML
//! error recovery such as implied `tbody` elements. Only elements and text
//! survive the conversion; comments, doctypes, and processing instructions
//! are dropped.

use std::path::Path;

use ego_tree::NodeRef;
use scraper::Html;
use tracing::{debug, instrument};

use tbcindex_shared::{Result, TbcIndexError};

use crate::{DOCUMENT_TAG, FRAGMENT_TAG, Node, query};

/// Parse a complete HTML document. The root is a `#document` element.
pub fn parse_document(html: &str) -> Node {
    let doc = Html::parse_document(html);
    into_tree(&doc, DOCUMENT_TAG)
}

/// Parse an HTML fragment. The root is a `#document-fragment` element.
pub fn parse_fragment(html: &str) -> Node {
    let doc = Html::parse_fragment(html);
    into_tree(&doc, FRAGMENT_TAG)
}

/// Read and parse an HTML file.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_document(path: &Path) -> Result<Node> {
    let html = std::fs::read_to_string(path).map_err(|e| TbcIndexError::io(path, e))?;
    let root = parse_document(&html);
    debug!(
        bytes = html.len(),
        nodes = query::descendants(&root).count(),
        "parsed document"
    );
    Ok(root)
}

fn into_tree(doc: &Html, root_tag: &str) -> Node {
    convert(doc.tree.root()).unwrap_or_else(|| Node::element(root_tag, Vec::new(), Vec::new()))
}

fn convert(node: NodeRef<'_, scraper::Node>) -> Option<Node> {
    match node.value() {
        scraper::Node::Document => Some(Node::element(DOCUMENT_TAG, Vec::new(), children_of(node))),
        scraper::Node::Fragment => Some(Node::element(FRAGMENT_TAG, Vec::new(), children_of(node))),
        scraper::Node::Element(el) => {
            let attrs = el
                .attrs()
                .map(|(name, value)| (name.to_owned(), value.to_owned()))
                .collect();
            Some(Node::element(el.name(), attrs, children_of(node)))
        }
        scraper::Node::Text(text) => {
            let value: &str = text;
            Some(Node::text(value))
        }
        _ => None,
    }
}

fn children_of(node: NodeRef<'_, scraper::Node>) -> Vec<Node> {
    node.children().filter_map(convert).collect()
}
