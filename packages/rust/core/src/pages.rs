//! Locally mirrored post pages (`NNNN_slug.htm` next to the index page).
//!
//! Each post is stored under a four-digit prefix. A prefix may have both an
//! HTML and a Markdown copy; the HTML copy always wins.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument, warn};

use tbcindex_shared::{Result, TbcIndexError, TocEntry};

/// Matches `NNNN_rest`.
static PAGE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})_(.+)$").expect("page name regex"));

/// Matches a trailing `.htm` (or `.ht`) for normalization to `.html`.
static HTM_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.htm?$").expect("htm suffix regex"));

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The parts of a page file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageName<'a> {
    /// Four-digit post prefix.
    pub prefix: &'a str,
    /// Everything after the `_`.
    pub rest: &'a str,
    /// Lower-cased text after the last `.` of `rest` (all of `rest` if it has no dot).
    pub ext: String,
}

/// Which copy of a page was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Html,
    Markdown,
}

/// One post's local copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPage {
    pub prefix: String,
    pub html_file: Option<String>,
    pub md_file: Option<String>,
    /// Name the page should be published under (`.htm` becomes `.html`).
    pub final_file: String,
    pub kind: PageKind,
    /// File text with `&nbsp;` replaced by a plain space.
    pub content: String,
}

/// Local pages keyed by prefix.
#[derive(Debug, Clone, Default)]
pub struct LocalPages {
    pages: BTreeMap<String, LocalPage>,
}

impl LocalPages {
    pub fn get(&self, prefix: &str) -> Option<&LocalPage> {
        self.pages.get(prefix)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// The local page an entry points at, via the prefix of the last path
    /// segment of its internal URL.
    pub fn page_for(&self, entry: &TocEntry) -> Option<&LocalPage> {
        let file_name = entry.url_internal.rsplit('/').next()?;
        let name = parse_page_name(file_name)?;
        self.pages.get(name.prefix)
    }

    /// Content of the entry's local page, if there is one.
    pub fn content_for(&self, entry: &TocEntry) -> Option<&str> {
        self.page_for(entry).map(|page| page.content.as_str())
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Split a page file name into prefix, rest, and extension.
///
/// Returns `None` for names not shaped `NNNN_rest` or with an empty extension.
pub fn parse_page_name(file_name: &str) -> Option<PageName<'_>> {
    let caps = PAGE_NAME_RE.captures(file_name)?;
    let prefix = caps.get(1)?.as_str();
    let rest = caps.get(2)?.as_str();
    let ext = rest.rsplit('.').next().unwrap_or_default().to_lowercase();
    if ext.is_empty() {
        return None;
    }
    Some(PageName { prefix, rest, ext })
}

/// Load every `NNNN_*.{html,htm,md}` file directly inside `dir`.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn load_local_pages(dir: &Path) -> Result<LocalPages> {
    let read_dir = std::fs::read_dir(dir).map_err(|e| TbcIndexError::io(dir, e))?;

    let mut files: Vec<String> = Vec::new();
    for dir_entry in read_dir {
        let dir_entry = dir_entry.map_err(|e| TbcIndexError::io(dir, e))?;
        let file_type = dir_entry
            .file_type()
            .map_err(|e| TbcIndexError::io(dir_entry.path(), e))?;
        if !file_type.is_file() {
            continue;
        }
        if let Some(name) = dir_entry.file_name().to_str() {
            files.push(name.to_owned());
        }
    }
    files.sort();

    let mut pages: BTreeMap<String, LocalPage> = BTreeMap::new();
    for file_name in &files {
        let Some(name) = parse_page_name(file_name) else {
            continue;
        };
        let kind = match name.ext.as_str() {
            "html" | "htm" => PageKind::Html,
            "md" => PageKind::Markdown,
            _ => continue,
        };

        let page = pages
            .entry(name.prefix.to_owned())
            .or_insert_with(|| LocalPage {
                prefix: name.prefix.to_owned(),
                html_file: None,
                md_file: None,
                final_file: String::new(),
                kind,
                content: String::new(),
            });

        match kind {
            PageKind::Html => {
                page.html_file = Some(file_name.clone());
                page.final_file = HTM_SUFFIX_RE.replace(file_name, ".html").into_owned();
            }
            PageKind::Markdown if page.html_file.is_none() => {
                page.md_file = Some(file_name.clone());
                page.final_file = file_name.clone();
            }
            PageKind::Markdown => continue,
        }
        page.kind = kind;
        page.content = read_page_content(&dir.join(file_name))?;
    }

    debug!(files = files.len(), pages = pages.len(), "local pages loaded");
    Ok(LocalPages { pages })
}

fn read_page_content(path: &Path) -> Result<String> {
    let raw = std::fs::read_to_string(path).map_err(|e| TbcIndexError::io(path, e))?;
    if raw.trim().is_empty() {
        warn!(path = %path.display(), "empty page file");
    }
    Ok(clean_content(&raw))
}

/// Replace every `&nbsp;` entity with a plain space.
pub fn clean_content(raw: &str) -> String {
    raw.replace("&nbsp;", " ")
}
