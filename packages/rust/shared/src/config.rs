//! Application configuration for tbcindex.
//!
//! User config lives at `~/.tbcindex/tbcindex.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TbcIndexError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "tbcindex.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".tbcindex";

/// Canonical domain prefix of the blog's permanent post URLs.
pub const DEFAULT_EXTERNAL_PREFIX: &str = "http://thebuildingcoder.typepad.com/";

/// File extension of the locally mirrored post pages.
pub const DEFAULT_INTERNAL_SUFFIX: &str = ".htm";

/// Leading text of the `h4` headings that open a topic section.
pub const DEFAULT_TOPIC_HEADER_PREFIX: &str = "5.";

/// Text found in a header cell of the table-of-contents table.
pub const DEFAULT_TOC_HEADER_MARKER: &str = "Nr";

// ---------------------------------------------------------------------------
// Config structs (matching tbcindex.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Index page conventions.
    #[serde(default)]
    pub source: SourceConfig,

    /// Default file locations.
    #[serde(default)]
    pub paths: PathsConfig,
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Prefix identifying a link to the blog itself.
    #[serde(default = "default_external_prefix")]
    pub external_prefix: String,

    /// Suffix identifying a link to a local page copy.
    #[serde(default = "default_internal_suffix")]
    pub internal_suffix: String,

    /// Prefix of topic-section `h4` headings.
    #[serde(default = "default_topic_header_prefix")]
    pub topic_header_prefix: String,

    /// Substring of a `th` cell that marks the TOC table.
    #[serde(default = "default_toc_header_marker")]
    pub toc_header_marker: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            external_prefix: default_external_prefix(),
            internal_suffix: default_internal_suffix(),
            topic_header_prefix: default_topic_header_prefix(),
            toc_header_marker: default_toc_header_marker(),
        }
    }
}

fn default_external_prefix() -> String {
    DEFAULT_EXTERNAL_PREFIX.into()
}
fn default_internal_suffix() -> String {
    DEFAULT_INTERNAL_SUFFIX.into()
}
fn default_topic_header_prefix() -> String {
    DEFAULT_TOPIC_HEADER_PREFIX.into()
}
fn default_toc_header_marker() -> String {
    DEFAULT_TOC_HEADER_MARKER.into()
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// The blog's index page.
    #[serde(default = "default_index_file")]
    pub index_file: String,

    /// Directory holding the mirrored `NNNN_*.htm` pages.
    #[serde(default = "default_pages_dir")]
    pub pages_dir: String,

    /// SQLite database file.
    #[serde(default = "default_database")]
    pub database: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            index_file: default_index_file(),
            pages_dir: default_pages_dir(),
            database: default_database(),
        }
    }
}

fn default_index_file() -> String {
    "tbc/a/index.html".into()
}
fn default_pages_dir() -> String {
    "tbc/a".into()
}
fn default_database() -> String {
    "tbc.db".into()
}

// ---------------------------------------------------------------------------
// Scrape config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Match patterns handed to the extraction core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeConfig {
    /// Prefix of external (blog) URLs.
    pub external_prefix: String,
    /// Suffix of internal (local copy) URLs.
    pub internal_suffix: String,
    /// Prefix of topic-section headings.
    pub topic_header_prefix: String,
    /// Marker text inside the TOC table's header cells.
    pub toc_header_marker: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ScrapeConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            external_prefix: config.source.external_prefix.clone(),
            internal_suffix: config.source.internal_suffix.clone(),
            topic_header_prefix: config.source.topic_header_prefix.clone(),
            toc_header_marker: config.source.toc_header_marker.clone(),
        }
    }
}

impl ScrapeConfig {
    /// Reject empty patterns; an empty prefix would match every link.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("external_prefix", &self.external_prefix),
            ("internal_suffix", &self.internal_suffix),
            ("topic_header_prefix", &self.topic_header_prefix),
            ("toc_header_marker", &self.toc_header_marker),
        ];
        for (name, value) in fields {
            if value.is_empty() {
                return Err(TbcIndexError::validation(format!(
                    "[source] {name} must not be empty"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.tbcindex/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| TbcIndexError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.tbcindex/tbcindex.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| TbcIndexError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| TbcIndexError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| TbcIndexError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| TbcIndexError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| TbcIndexError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("external_prefix"));
        assert!(toml_str.contains("thebuildingcoder.typepad.com"));
        assert!(toml_str.contains("tbc.db"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[source]
internal_suffix = ".html"

[paths]
database = "/tmp/tbc.db"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.source.internal_suffix, ".html");
        assert_eq!(config.source.external_prefix, DEFAULT_EXTERNAL_PREFIX);
        assert_eq!(config.source.toc_header_marker, "Nr");
        assert_eq!(config.paths.database, "/tmp/tbc.db");
        assert_eq!(config.paths.pages_dir, "tbc/a");
    }

    #[test]
    fn scrape_config_from_app_config() {
        let scrape = ScrapeConfig::default();
        assert_eq!(scrape.external_prefix, "http://thebuildingcoder.typepad.com/");
        assert_eq!(scrape.internal_suffix, ".htm");
        assert_eq!(scrape.topic_header_prefix, "5.");
        assert_eq!(scrape.toc_header_marker, "Nr");
        assert!(scrape.validate().is_ok());
    }

    #[test]
    fn empty_pattern_fails_validation() {
        let mut scrape = ScrapeConfig::default();
        scrape.internal_suffix.clear();
        let err = scrape.validate().unwrap_err();
        assert!(err.to_string().contains("internal_suffix"));
    }

    #[test]
    fn load_config_from_missing_file_is_io_error() {
        let result = load_config_from(Path::new("/nonexistent/tbcindex.toml"));
        assert!(matches!(result, Err(TbcIndexError::Io { .. })));
    }
}
