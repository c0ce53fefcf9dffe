//! tbcindex CLI — table-of-contents extraction for The Building Coder.
//!
//! Scrapes the blog's index page, tags entries with topics, and stores them
//! together with their locally mirrored pages.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
