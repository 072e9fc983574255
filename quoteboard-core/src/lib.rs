//! Quoteboard Core — market-board snapshot extraction and aggregation.
//!
//! One capture run is a single linear pass: for each configured table,
//! fetch the page's rows, parse them into typed quotes, and install them
//! into a two-level board (table → symbol → quote). The board serializes
//! to one pretty-JSON snapshot file.
//!
//! - Table descriptors with pre-rendered CSS selectors ([`tables`])
//! - Row extraction behind a mockable trait ([`source`])
//! - Row → quote parsing with field-tagged errors ([`quote`])
//! - Last-write-wins aggregation ([`board`])
//! - JSON export and snapshot persistence ([`export`])
//! - The run orchestrator and parse policy ([`capture`])

pub mod board;
pub mod capture;
pub mod export;
pub mod quote;
pub mod source;
pub mod tables;

pub use board::Board;
pub use capture::{
    capture, CaptureError, CaptureProgress, CaptureSummary, ParsePolicy, StdoutProgress,
};
pub use export::{export_json, import_json, write_snapshot, SnapshotError};
pub use quote::{parse_row, strip_symbol_prefix, ParseError, Quote, QuoteField};
pub use source::{Deadline, HttpSource, RawRow, RowSource, ScrapeError};
pub use tables::{default_tables, TableSetConfig, TableSpec};
