//! `import` pipeline: index page → entries → local page content → database.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use tbcindex_shared::{PageRecord, Result, ScrapeConfig};
use tbcindex_storage::Storage;

use crate::pages::{self, LocalPages};
use crate::pipeline;

/// Configuration for [`import_index`].
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// The blog's index page.
    pub index_file: PathBuf,
    /// Directory of local `NNNN_*.htm` copies; `None` stores empty content.
    pub pages_dir: Option<PathBuf>,
    /// Database file to write.
    pub database: PathBuf,
    /// Delete all stored rows before writing.
    pub replace: bool,
    /// Match patterns for the scrape.
    pub scrape: ScrapeConfig,
}

/// Result of [`import_index`].
#[derive(Debug)]
pub struct ImportResult {
    /// Entries extracted from the index page.
    pub entries: usize,
    /// Entries that received local page content.
    pub with_content: usize,
    /// Entries with at least one topic.
    pub with_topic: usize,
    /// Rows removed before writing (only with `replace`).
    pub deleted: u64,
    /// Rows in the database after the import.
    pub stored: u64,
    pub elapsed: Duration,
}

/// Progress callback for reporting import status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, result: &ImportResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _result: &ImportResult) {}
}

/// Run the full `import` pipeline.
///
/// 1. Scrape the index page
/// 2. Load local page files (optional)
/// 3. Upsert every entry with its page content in one transaction,
///    clearing the table first when `replace` is set
#[instrument(skip_all, fields(index = %config.index_file.display()))]
pub async fn import_index(
    config: &ImportConfig,
    progress: &dyn ProgressReporter,
) -> Result<ImportResult> {
    let start = Instant::now();

    progress.phase("Scraping index page");
    let entries = pipeline::scrape_index(&config.index_file, &config.scrape)?;

    let local_pages = match &config.pages_dir {
        Some(dir) => {
            progress.phase("Loading local pages");
            pages::load_local_pages(dir)?
        }
        None => LocalPages::default(),
    };

    let records: Vec<PageRecord> = entries
        .into_iter()
        .map(|entry| {
            let content = local_pages.content_for(&entry).unwrap_or_default().to_owned();
            PageRecord {
                entry,
                content,
                imported_at: None,
            }
        })
        .collect();

    let with_content = records.iter().filter(|r| !r.content.is_empty()).count();
    if config.pages_dir.is_some() && with_content < records.len() {
        warn!(
            missing = records.len() - with_content,
            "some entries have no local page content"
        );
    }

    progress.phase("Writing database");
    let storage = Storage::open(&config.database).await?;
    let deleted = if config.replace {
        storage.replace_pages(&records).await?
    } else {
        storage.upsert_pages(&records).await?;
        0
    };
    let stored = storage.count_pages().await?;

    let result = ImportResult {
        entries: records.len(),
        with_content,
        with_topic: records.iter().filter(|r| r.entry.has_topic()).count(),
        deleted,
        stored,
        elapsed: start.elapsed(),
    };

    info!(
        entries = result.entries,
        with_content = result.with_content,
        stored = result.stored,
        "import complete"
    );
    progress.done(&result);
    Ok(result)
}
