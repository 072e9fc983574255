//! Capture orchestrator — the run's single linear pass.
//!
//! For each table: scrape rows → parse → install into the board. The whole
//! run shares one wall-clock deadline. Scrape failures abort the run; parse
//! failures are handled by one `ParsePolicy` applied in exactly one place.

use crate::board::Board;
use crate::quote::{self, ParseError, Quote};
use crate::source::{Deadline, RowSource, ScrapeError};
use crate::tables::TableSpec;
use chrono::Utc;
use thiserror::Error;

/// What to do when a single row fails to parse.
///
/// Scrape and I/O failures always abort regardless of policy; this only
/// governs per-record parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParsePolicy {
    /// Log the row and keep going (default): one malformed row does not
    /// discard an otherwise-good table.
    #[default]
    SkipAndWarn,
    /// Abort the run on the first malformed row.
    FailFast,
}

/// Progress callbacks for a capture run.
///
/// This is the process log: informational, not a stable machine interface.
pub trait CaptureProgress: Send {
    /// Called before a table's rows are fetched.
    fn on_table_start(&self, table: &str, selector: &str, index: usize, total: usize);

    /// Called for each successfully parsed row.
    fn on_row(&self, table: &str, index: usize, quote: &Quote);

    /// Called when a malformed row is skipped under `SkipAndWarn`.
    fn on_parse_skip(&self, table: &str, row: usize, error: &ParseError);

    /// Called when a table's pass completes.
    fn on_table_complete(&self, table: &str, parsed: usize, skipped: usize);

    /// Called when the whole run completes.
    fn on_complete(&self, summary: &CaptureSummary);
}

/// Progress reporter that prints to stdout.
pub struct StdoutProgress;

impl CaptureProgress for StdoutProgress {
    fn on_table_start(&self, table: &str, selector: &str, index: usize, total: usize) {
        println!("[{}/{}] Scraping '{table}' on {selector}", index + 1, total);
    }

    fn on_row(&self, _table: &str, index: usize, quote: &Quote) {
        println!(
            "  {:>2}. {:<10} | {:<40} | {:>12.2} | {:>+8.4}%",
            index + 1,
            quote.symbol,
            quote.name,
            quote.value,
            quote.percent_change,
        );
    }

    fn on_parse_skip(&self, table: &str, row: usize, error: &ParseError) {
        println!("  WARN: skipping row {row} of '{table}': {error}");
    }

    fn on_table_complete(&self, table: &str, parsed: usize, skipped: usize) {
        println!("  OK: {table}: {parsed} rows ({skipped} skipped)");
    }

    fn on_complete(&self, summary: &CaptureSummary) {
        println!(
            "\nCapture complete: {} quotes across {} tables, {} rows skipped",
            summary.rows_parsed, summary.tables, summary.rows_skipped
        );
    }
}

/// A row skipped under `SkipAndWarn`, kept for the summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    pub table: String,
    pub row: usize,
    pub error: ParseError,
}

/// Outcome of a completed capture run.
#[derive(Debug, Default)]
pub struct CaptureSummary {
    pub tables: usize,
    pub rows_parsed: usize,
    pub rows_skipped: usize,
    pub skips: Vec<SkippedRow>,
}

impl CaptureSummary {
    pub fn clean(&self) -> bool {
        self.rows_skipped == 0
    }
}

/// A fatal capture failure, tagged with the table that failed.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("table '{table}': {source}")]
    Scrape {
        table: String,
        #[source]
        source: ScrapeError,
    },

    #[error("table '{table}' row {row}: {source}")]
    Parse {
        table: String,
        row: usize,
        #[source]
        source: ParseError,
    },
}

/// Run one capture pass over `tables`, installing quotes into `board`.
///
/// Tables are processed sequentially; a scrape failure on any table aborts
/// the run. Every quote from one table's pass carries the same timestamp,
/// taken at that table's scrape start.
pub fn capture(
    source: &dyn RowSource,
    tables: &[TableSpec],
    policy: ParsePolicy,
    deadline: &Deadline,
    progress: &dyn CaptureProgress,
    board: &mut Board,
) -> Result<CaptureSummary, CaptureError> {
    let total = tables.len();
    let mut summary = CaptureSummary::default();

    for (i, table) in tables.iter().enumerate() {
        progress.on_table_start(&table.name, &table.row_selector, i, total);

        // State as observed at this table's scrape start.
        let captured_at = Utc::now();

        let rows = source
            .fetch_rows(table, deadline)
            .map_err(|source| CaptureError::Scrape {
                table: table.name.clone(),
                source,
            })?;

        let mut parsed = 0;
        let mut skipped = 0;
        for (row_index, row) in rows.iter().enumerate() {
            match quote::parse_row(row, captured_at) {
                Ok(quote) => {
                    progress.on_row(&table.name, row_index, &quote);
                    board.insert(&table.name, quote);
                    parsed += 1;
                }
                Err(error) => match policy {
                    ParsePolicy::FailFast => {
                        return Err(CaptureError::Parse {
                            table: table.name.clone(),
                            row: row_index,
                            source: error,
                        });
                    }
                    ParsePolicy::SkipAndWarn => {
                        progress.on_parse_skip(&table.name, row_index, &error);
                        summary.skips.push(SkippedRow {
                            table: table.name.clone(),
                            row: row_index,
                            error,
                        });
                        skipped += 1;
                    }
                },
            }
        }

        progress.on_table_complete(&table.name, parsed, skipped);
        summary.tables += 1;
        summary.rows_parsed += parsed;
        summary.rows_skipped += skipped;
    }

    progress.on_complete(&summary);
    Ok(summary)
}
