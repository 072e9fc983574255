//! Quoteboard CLI — capture market-board snapshots and inspect table sets.
//!
//! Commands:
//! - `capture` — scrape the configured tables and write a JSON snapshot
//! - `tables` — print the configured table set with rendered selectors

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use quoteboard_core::capture::{capture, ParsePolicy, StdoutProgress};
use quoteboard_core::export::write_snapshot;
use quoteboard_core::source::{Deadline, HttpSource};
use quoteboard_core::tables::{default_tables, TableSetConfig, TableSpec};
use quoteboard_core::Board;

#[derive(Parser)]
#[command(
    name = "quoteboard",
    about = "Quoteboard CLI — market-board snapshot scraper"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the configured tables and write a JSON snapshot.
    Capture {
        /// Page to scrape.
        #[arg(long, default_value = "https://finance.yahoo.com")]
        url: String,

        /// Output file for the snapshot.
        #[arg(long, default_value = "output.json")]
        out: PathBuf,

        /// Whole-run deadline in seconds (shared by all tables).
        #[arg(long, default_value_t = 60)]
        timeout_secs: u64,

        /// TOML file describing a custom table set. Defaults to the
        /// built-in crypto/gainers/losers set.
        #[arg(long)]
        tables: Option<PathBuf>,

        /// Abort on the first malformed row instead of skipping it.
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Print the configured table set with rendered selectors.
    Tables {
        /// TOML file describing a custom table set.
        #[arg(long)]
        tables: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Capture {
            url,
            out,
            timeout_secs,
            tables,
            strict,
        } => run_capture(url, out, timeout_secs, tables, strict),
        Commands::Tables { tables } => run_tables(tables),
    }
}

fn load_tables(path: Option<PathBuf>) -> Result<Vec<TableSpec>> {
    match path {
        Some(path) => TableSetConfig::load(&path)
            .with_context(|| format!("failed to load table set from {}", path.display())),
        None => Ok(default_tables()),
    }
}

fn run_capture(
    url: String,
    out: PathBuf,
    timeout_secs: u64,
    tables: Option<PathBuf>,
    strict: bool,
) -> Result<()> {
    let specs = load_tables(tables)?;
    let policy = if strict {
        ParsePolicy::FailFast
    } else {
        ParsePolicy::SkipAndWarn
    };

    let source = HttpSource::new(url.as_str());
    let deadline = Deadline::from_now(Duration::from_secs(timeout_secs));

    let mut board = Board::new();
    let summary = capture(
        &source,
        &specs,
        policy,
        &deadline,
        &StdoutProgress,
        &mut board,
    )
    .with_context(|| format!("capture from {url} failed"))?;

    write_snapshot(&out, &board)?;
    println!(
        "Wrote {} quotes across {} tables to {}",
        summary.rows_parsed,
        summary.tables,
        out.display()
    );
    if !summary.clean() {
        println!("Note: {} rows were skipped as malformed", summary.rows_skipped);
    }
    Ok(())
}

fn run_tables(tables: Option<PathBuf>) -> Result<()> {
    let specs = load_tables(tables)?;
    for spec in &specs {
        println!("{}", spec.name);
        println!("  rows:   {}", spec.row_selector);
        println!("  link:   {}", spec.link_selector);
        println!("  value:  {}", spec.value_selector);
        println!("  change: {}", spec.change_selector);
    }
    Ok(())
}
