//! Row extraction — the remote-page boundary.
//!
//! The `RowSource` trait abstracts over how rows are pulled out of the target
//! page so the capture pipeline can be exercised against an in-memory mock.
//! The shipped implementation, `HttpSource`, fetches the page over plain HTTP
//! and runs CSS selection on the parsed document.
//!
//! Alignment is enforced here, at the boundary: extraction returns one
//! ordered list of per-row tuples. A row that matches the row selector but is
//! missing any of its cells is reported as selector drift, not silently
//! skipped — the upstream page's markup is a de facto schema contract and
//! changes to it must surface as a named failure.

use crate::tables::TableSpec;
use scraper::{Html, Selector};
use std::time::{Duration, Instant};
use thiserror::Error;

/// The four attribute values extracted from one instrument row, in row order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// Link target of the first-column anchor (e.g. `/quote/BTC-USD`).
    pub link: String,
    /// Display name from the anchor's `title` attribute.
    pub title: String,
    /// Raw quote value text from the value stream cell.
    pub value_text: String,
    /// Raw percent-change text from the change stream cell.
    pub change_text: String,
}

/// Wall-clock deadline covering the whole run.
///
/// There is one deadline per run, not per selector; each remote call spends
/// from the same budget. Once it elapses, any in-flight extraction fails.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Instant,
}

impl Deadline {
    /// A deadline `budget` from now.
    pub fn from_now(budget: Duration) -> Self {
        Self {
            expires_at: Instant::now() + budget,
        }
    }

    /// Time left before the deadline, or `None` once it has elapsed.
    pub fn remaining(&self) -> Option<Duration> {
        self.expires_at
            .checked_duration_since(Instant::now())
            .filter(|d| !d.is_zero())
    }
}

/// Structured errors for row extraction.
///
/// All of these are fatal to the run: they mean the page could not be
/// observed in the shape the table descriptors promise.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("HTTP {status} from {url}")]
    BadStatus { url: String, status: u16 },

    #[error("run deadline elapsed while evaluating `{selector}`")]
    DeadlineExceeded { selector: String },

    #[error("no rows matched `{selector}` — upstream markup may have changed")]
    NoRows { selector: String },

    #[error("row {row} of table '{table}' has no {missing} — selector drift")]
    MalformedRow {
        table: String,
        row: usize,
        missing: &'static str,
    },

    #[error("invalid selector `{selector}`: {reason}")]
    BadSelector { selector: String, reason: String },
}

/// Trait for row sources (live HTTP page, mock fixtures).
///
/// Implementations handle getting the document and evaluating selectors.
/// The capture pipeline sits above this trait and never sees a DOM.
pub trait RowSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Block until the table's rows are available, then return them in
    /// document order, honoring the run deadline.
    fn fetch_rows(&self, table: &TableSpec, deadline: &Deadline)
        -> Result<Vec<RawRow>, ScrapeError>;
}

/// Live row source: fetch the page over HTTP, select rows with CSS.
///
/// The page is fetched once per table and all three cell selectors run
/// against that single document.
pub struct HttpSource {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the page body, spending from the run deadline.
    fn fetch_document(&self, table: &TableSpec, deadline: &Deadline) -> Result<Html, ScrapeError> {
        let remaining = deadline
            .remaining()
            .ok_or_else(|| ScrapeError::DeadlineExceeded {
                selector: table.row_selector.clone(),
            })?;

        let resp = self
            .client
            .get(&self.url)
            .timeout(remaining)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    ScrapeError::DeadlineExceeded {
                        selector: table.row_selector.clone(),
                    }
                } else {
                    ScrapeError::Navigation {
                        url: self.url.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::BadStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().map_err(|e| ScrapeError::Navigation {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Html::parse_document(&body))
    }
}

impl RowSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch_rows(
        &self,
        table: &TableSpec,
        deadline: &Deadline,
    ) -> Result<Vec<RawRow>, ScrapeError> {
        let document = self.fetch_document(table, deadline)?;
        extract_rows(&document, table)
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|e| ScrapeError::BadSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Evaluate a table's selectors against a parsed document and return the
/// aligned per-row tuples.
///
/// Each cell selector is evaluated relative to its row element, so the four
/// attribute streams cannot drift out of alignment. Zero matching rows and
/// rows missing a cell or attribute are both hard errors.
pub fn extract_rows(document: &Html, table: &TableSpec) -> Result<Vec<RawRow>, ScrapeError> {
    let row_sel = parse_selector(&table.row_selector)?;
    let link_sel = parse_selector(&table.link_selector)?;
    let value_sel = parse_selector(&table.value_selector)?;
    let change_sel = parse_selector(&table.change_selector)?;

    let malformed = |row: usize, missing: &'static str| ScrapeError::MalformedRow {
        table: table.name.clone(),
        row,
        missing,
    };

    let mut rows = Vec::new();
    for (i, tr) in document.select(&row_sel).enumerate() {
        let anchor = tr
            .select(&link_sel)
            .next()
            .ok_or_else(|| malformed(i, "link cell"))?;
        let link = anchor
            .value()
            .attr("href")
            .ok_or_else(|| malformed(i, "link href"))?;
        let title = anchor
            .value()
            .attr("title")
            .ok_or_else(|| malformed(i, "link title"))?;

        let value_text = tr
            .select(&value_sel)
            .next()
            .and_then(|el| el.value().attr("value"))
            .ok_or_else(|| malformed(i, "value stream"))?;

        let change_text = tr
            .select(&change_sel)
            .next()
            .and_then(|el| el.value().attr("value"))
            .ok_or_else(|| malformed(i, "change stream"))?;

        rows.push(RawRow {
            link: link.to_string(),
            title: title.to_string(),
            value_text: value_text.to_string(),
            change_text: change_text.to_string(),
        });
    }

    if rows.is_empty() {
        return Err(ScrapeError::NoRows {
            selector: table.row_selector.clone(),
        });
    }

    Ok(rows)
}
