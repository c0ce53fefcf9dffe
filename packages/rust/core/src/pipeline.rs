//! End-to-end scrape: document → topic index → TOC entries.

use std::path::Path;

use tracing::{info, instrument};

use tbcindex_dom::Node;
use tbcindex_shared::{Result, ScrapeConfig, TocEntry};

use crate::toc;
use crate::topics;

/// Extract the table of contents from a parsed index page.
///
/// Builds the topic index once, then parses the TOC table with it. The only
/// error is [`tbcindex_shared::TbcIndexError::TocTableNotFound`]; malformed
/// rows are dropped and missing fields are left empty.
#[instrument(skip_all)]
pub fn scrape_document(document: &Node, config: &ScrapeConfig) -> Result<Vec<TocEntry>> {
    let topic_index = topics::build_topic_index(document, config);
    info!(urls = topic_index.len(), "found topic mappings");

    let entries = toc::extract_toc_entries(document, &topic_index, config)?;
    info!(entries = entries.len(), "extracted TOC entries");
    Ok(entries)
}

/// Load an index page from disk and scrape it.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn scrape_index(path: &Path, config: &ScrapeConfig) -> Result<Vec<TocEntry>> {
    config.validate()?;
    let document = tbcindex_dom::load_document(path)?;
    scrape_document(&document, config)
}

// ---------------------------------------------------------------------------
// Coverage summary
// ---------------------------------------------------------------------------

/// How many entries received at least one topic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopicCoverage {
    pub total: usize,
    pub with_topic: usize,
    pub without_topic: usize,
    /// Share of entries with a topic, 0–100. Zero when there are no entries.
    pub percent: f64,
}

impl TopicCoverage {
    pub fn of(entries: &[TocEntry]) -> Self {
        let total = entries.len();
        let with_topic = entries.iter().filter(|e| e.has_topic()).count();
        let percent = if total == 0 {
            0.0
        } else {
            with_topic as f64 / total as f64 * 100.0
        };
        Self {
            total,
            with_topic,
            without_topic: total - with_topic,
            percent,
        }
    }
}
