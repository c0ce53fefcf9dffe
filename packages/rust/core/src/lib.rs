//! Core extraction logic and pipelines for tbcindex.
//!
//! This crate turns a parsed index page into table-of-contents entries
//! (`topics`, `toc`, `pipeline`) and ties that together with local page
//! files and storage for the `import` workflow.

pub mod import;
pub mod pages;
pub mod pipeline;
pub mod toc;
pub mod topics;

pub use pipeline::{TopicCoverage, scrape_document, scrape_index};
pub use topics::TopicIndex;
