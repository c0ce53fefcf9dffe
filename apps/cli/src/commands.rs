//! CLI command definitions, routing, and tracing setup.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use tbcindex_core::TopicCoverage;
use tbcindex_core::import::{ImportConfig, ImportResult, ProgressReporter};
use tbcindex_shared::{AppConfig, ScrapeConfig, TocEntry, init_config, load_config};
use tbcindex_storage::Storage;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// tbcindex — extract The Building Coder's table of contents.
#[derive(Parser)]
#[command(
    name = "tbcindex",
    version,
    about = "Extract the blog index table of contents, tag entries with topics, and store them.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Scrape the index page and report the entries found.
    Scrape {
        /// Index page (defaults to `paths.index_file` from config).
        #[arg(short, long)]
        index: Option<PathBuf>,

        /// Print every entry as a JSON array instead of the report.
        #[arg(long)]
        json: bool,

        /// Number of entries shown in the report.
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Scrape the index page and store entries with their local page content.
    Import {
        /// Index page (defaults to `paths.index_file` from config).
        #[arg(short, long)]
        index: Option<PathBuf>,

        /// Directory of local page copies (defaults to `paths.pages_dir`).
        #[arg(short, long)]
        pages: Option<PathBuf>,

        /// Skip local page content.
        #[arg(long, conflicts_with = "pages")]
        no_pages: bool,

        /// Database file (defaults to `paths.database`).
        #[arg(long)]
        db: Option<PathBuf>,

        /// Delete all stored rows before importing.
        #[arg(long)]
        replace: bool,
    },

    /// List stored entries.
    List {
        /// Database file (defaults to `paths.database`).
        #[arg(long)]
        db: Option<PathBuf>,

        /// Maximum rows to show.
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Delete all stored entries.
    Clear {
        /// Database file (defaults to `paths.database`).
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "tbcindex=info",
        1 => "tbcindex=debug",
        _ => "tbcindex=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // stdout carries command output (e.g. `scrape --json`); logs go to stderr.
    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Scrape { index, json, limit } => cmd_scrape(index, json, limit),
        Command::Import {
            index,
            pages,
            no_pages,
            db,
            replace,
        } => cmd_import(index, pages, no_pages, db, replace).await,
        Command::List { db, limit } => cmd_list(db, limit).await,
        Command::Clear { db } => cmd_clear(db).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_scrape(index: Option<PathBuf>, json: bool, limit: usize) -> Result<()> {
    let config = load_config()?;
    let index = index.unwrap_or_else(|| PathBuf::from(&config.paths.index_file));

    info!(index = %index.display(), "scraping index page");
    let entries = tbcindex_core::scrape_index(&index, &ScrapeConfig::from(&config))?;

    let mut out = std::io::stdout().lock();
    write_scrape_output(&mut out, &entries, json, limit)?;
    Ok(())
}

async fn cmd_import(
    index: Option<PathBuf>,
    pages: Option<PathBuf>,
    no_pages: bool,
    db: Option<PathBuf>,
    replace: bool,
) -> Result<()> {
    let config = load_config()?;

    let pages_dir = if no_pages {
        None
    } else {
        Some(pages.unwrap_or_else(|| PathBuf::from(&config.paths.pages_dir)))
    };

    let import_config = ImportConfig {
        index_file: index.unwrap_or_else(|| PathBuf::from(&config.paths.index_file)),
        pages_dir,
        database: database_path(&config, db),
        replace,
        scrape: ScrapeConfig::from(&config),
    };

    info!(
        index = %import_config.index_file.display(),
        database = %import_config.database.display(),
        replace,
        "importing index"
    );

    let reporter = CliProgress::new();
    let result = tbcindex_core::import::import_index(&import_config, &reporter).await?;

    println!();
    println!("  Import complete!");
    println!("  Entries:      {}", result.entries);
    println!("  With topics:  {}", result.with_topic);
    println!("  With content: {}", result.with_content);
    if replace {
        println!("  Deleted:      {}", result.deleted);
    }
    println!("  Stored rows:  {}", result.stored);
    println!("  Database:     {}", import_config.database.display());
    println!("  Time:         {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_list(db: Option<PathBuf>, limit: Option<usize>) -> Result<()> {
    let config = load_config()?;
    let path = database_path(&config, db);

    let storage = Storage::open_readonly(&path).await?;
    let records = storage.list_pages(limit).await?;
    if records.is_empty() {
        println!("No stored entries. Run 'import' first.");
        return Ok(());
    }

    println!(
        "{:>5} | {:<10} | {:<48} | {:<24} | {:>7}",
        "Nr", "Date", "Title", "Topic", "Content"
    );
    println!("{}", "-".repeat(106));
    for record in &records {
        let entry = &record.entry;
        println!(
            "{:>5} | {:<10} | {:<48} | {:<24} | {:>7}",
            entry.number,
            truncate(&entry.date, 10),
            truncate(&entry.title, 48),
            truncate(&entry.topic, 24),
            record.content.len()
        );
    }

    let total = storage.count_pages().await?;
    let with_topic = storage.count_with_topic().await?;
    println!(
        "\n{} of {} entries shown ({} with topics)",
        records.len(),
        total,
        with_topic
    );
    Ok(())
}

async fn cmd_clear(db: Option<PathBuf>) -> Result<()> {
    let config = load_config()?;
    let path = database_path(&config, db);
    if !path.exists() {
        return Err(eyre!("no database found at '{}'", path.display()));
    }

    println!("Deleting all existing data from tbc_pages...");
    let storage = Storage::open(&path).await?;
    let deleted = storage.delete_all().await?;
    let remaining = storage.count_pages().await?;

    println!("All data deleted ({deleted} rows).");
    println!("  Remaining rows: {remaining}");
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Report helpers
// ---------------------------------------------------------------------------

/// Write the `scrape` result: the full JSON array, or the text report.
fn write_scrape_output(
    out: &mut impl Write,
    entries: &[TocEntry],
    json: bool,
    limit: usize,
) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, entries)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "Successfully scraped {} entries", entries.len())?;
    write_entries(out, entries, limit)?;
    write_topic_summary(out, entries)?;
    Ok(())
}

fn write_entries(out: &mut impl Write, entries: &[TocEntry], limit: usize) -> Result<()> {
    if limit == 0 || entries.is_empty() {
        return Ok(());
    }

    writeln!(out, "\nFirst {} entries:", limit.min(entries.len()))?;
    for entry in entries.iter().take(limit) {
        writeln!(out, "{}: {} ({})", entry.number, entry.title, entry.date)?;
        writeln!(out, "  Topic: {}", entry.topic)?;
        writeln!(out, "  Categories: {}", entry.categories)?;
        writeln!(out, "  External: {}", entry.url_external)?;
        writeln!(out, "  Internal: {}\n", entry.url_internal)?;
    }
    Ok(())
}

fn write_topic_summary(out: &mut impl Write, entries: &[TocEntry]) -> Result<()> {
    let coverage = TopicCoverage::of(entries);

    writeln!(out, "=== TOPIC SUMMARY ===")?;
    writeln!(out, "Total entries: {}", coverage.total)?;
    writeln!(out, "Entries with topics: {}", coverage.with_topic)?;
    writeln!(out, "Entries without topics: {}", coverage.without_topic)?;
    writeln!(out, "Topic coverage: {:.1}%", coverage.percent)?;

    let samples: Vec<&TocEntry> = entries.iter().filter(|e| e.has_topic()).take(3).collect();
    if !samples.is_empty() {
        writeln!(out, "\nSample entries with topics:")?;
        for entry in samples {
            writeln!(out, "  {}: {} - Topic: {}", entry.number, entry.title, entry.topic)?;
        }
    }
    Ok(())
}

fn database_path(config: &AppConfig, db: Option<PathBuf>) -> PathBuf {
    db.unwrap_or_else(|| PathBuf::from(&config.paths.database))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _result: &ImportResult) {
        self.spinner.finish_and_clear();
    }
}
