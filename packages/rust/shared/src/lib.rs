//! Shared types, error model, and configuration for tbcindex.
//!
//! This crate is the foundation depended on by all other tbcindex crates.
//! It provides:
//! - [`TbcIndexError`] — the unified error type
//! - Domain types ([`TocEntry`], [`PageRecord`])
//! - Configuration ([`AppConfig`], [`ScrapeConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DEFAULT_EXTERNAL_PREFIX, DEFAULT_INTERNAL_SUFFIX, DEFAULT_TOC_HEADER_MARKER,
    DEFAULT_TOPIC_HEADER_PREFIX, PathsConfig, ScrapeConfig, SourceConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{Result, TbcIndexError};
pub use types::{PageRecord, TocEntry};
