//! Topic index: which topic sections of the index page link to which posts.
//!
//! Topic sections are `h4` headings such as `5.12. Ribbon` followed (inside
//! the same parent) by link lists. Every blog link in those lists is tagged
//! with the heading's topic name.

use std::collections::HashMap;

use tracing::{debug, instrument, trace};

use tbcindex_dom::{Node, extract_text, find_by_tag_name, find_parent};
use tbcindex_shared::ScrapeConfig;

// ---------------------------------------------------------------------------
// TopicIndex
// ---------------------------------------------------------------------------

/// URL → topic names, each list in first-seen order without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicIndex {
    topics: HashMap<String, Vec<String>>,
}

impl TopicIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag `url` with `topic`. Returns `false` if the pair was already known.
    pub fn insert(&mut self, url: &str, topic: &str) -> bool {
        let names = self.topics.entry(url.to_owned()).or_default();
        if names.iter().any(|name| name == topic) {
            return false;
        }
        names.push(topic.to_owned());
        true
    }

    /// Topic names for `url`; empty if no topic section links to it.
    pub fn topics_for(&self, url: &str) -> &[String] {
        self.topics.get(url).map(Vec::as_slice).unwrap_or_default()
    }

    /// Topic names for `url` joined with `", "`.
    pub fn joined(&self, url: &str) -> String {
        self.topics_for(url).join(", ")
    }

    /// Number of distinct URLs carrying at least one topic.
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Scan the document's topic sections and build the URL → topics index.
///
/// Headers without a parent, headers whose name is empty after stripping the
/// section number, and links without an `href` contribute nothing.
#[instrument(skip_all)]
pub fn build_topic_index(document: &Node, config: &ScrapeConfig) -> TopicIndex {
    let mut index = TopicIndex::new();
    let mut header_count = 0usize;

    for header in find_by_tag_name(document, "h4") {
        let text = extract_text(header);
        if !text.starts_with(&config.topic_header_prefix) {
            continue;
        }
        header_count += 1;

        let name = topic_name(&text, &config.topic_header_prefix);
        if name.is_empty() {
            continue;
        }

        let Some(parent) = find_parent(header, document) else {
            debug!(topic = name, "topic header has no parent, skipping");
            continue;
        };

        for list in find_by_tag_name(parent, "ul") {
            for link in find_by_tag_name(list, "a") {
                let Some(href) = link.attr("href") else {
                    continue;
                };
                if href.starts_with(&config.external_prefix) && index.insert(href, name) {
                    trace!(href, topic = name, "tagged url");
                }
            }
        }
    }

    debug!(headers = header_count, urls = index.len(), "topic index built");
    index
}

/// Strip a leading section number such as `5.12.` (trailing period optional)
/// and any whitespace after it.
///
/// Text that does not start with `prefix` followed by at least one digit is
/// returned unchanged.
pub(crate) fn topic_name<'a>(text: &'a str, prefix: &str) -> &'a str {
    let Some(rest) = text.strip_prefix(prefix) else {
        return text;
    };
    let after_digits = rest.trim_start_matches(|c: char| c.is_ascii_digit());
    if after_digits.len() == rest.len() {
        return text;
    }
    let after_dot = after_digits.strip_prefix('.').unwrap_or(after_digits);
    after_dot.trim_start()
}
