//! Quote records and row parsing.
//!
//! Converts one aligned `RawRow` into a typed `Quote`. Parsing never zeroes
//! a field it couldn't read: malformed text surfaces as a `ParseError`
//! naming the offending field and the raw value, and the caller decides
//! whether that aborts the run or skips the row.

use crate::source::RawRow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Link-target prefix stripped to obtain the symbol.
pub const SYMBOL_LINK_PREFIX: &str = "/quote/";

/// One instrument's parsed state at one capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub value: f64,
    pub percent_change: f64,
    /// Shared by every quote gathered in one pass over one table, captured
    /// at that table's scrape start.
    pub captured_at: DateTime<Utc>,
}

/// Which field of a row failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteField {
    Symbol,
    Value,
    PercentChange,
}

impl fmt::Display for QuoteField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuoteField::Symbol => "symbol",
            QuoteField::Value => "value",
            QuoteField::PercentChange => "percentChange",
        };
        f.write_str(name)
    }
}

/// A single row attribute that could not be converted to its field type.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot parse {field} from {raw:?}")]
pub struct ParseError {
    pub field: QuoteField,
    pub raw: String,
}

/// Strip the `/quote/` prefix from a link target.
///
/// Idempotent: a string without the prefix comes back unchanged, so an
/// already-stripped symbol survives a second pass.
pub fn strip_symbol_prefix(link: &str) -> &str {
    link.strip_prefix(SYMBOL_LINK_PREFIX).unwrap_or(link)
}

/// Parse one aligned row into a `Quote`.
///
/// The mapping is fixed by construction: `value` always comes from the
/// value stream cell and `percent_change` from the change stream cell.
/// There is no positional tuple anywhere for the two to swap through.
pub fn parse_row(row: &RawRow, captured_at: DateTime<Utc>) -> Result<Quote, ParseError> {
    let symbol = strip_symbol_prefix(row.link.trim());
    if symbol.is_empty() {
        return Err(ParseError {
            field: QuoteField::Symbol,
            raw: row.link.clone(),
        });
    }

    let value = parse_decimal(&row.value_text, QuoteField::Value)?;
    let percent_change = parse_decimal(&row.change_text, QuoteField::PercentChange)?;

    Ok(Quote {
        symbol: symbol.to_string(),
        name: row.title.trim().to_string(),
        value,
        percent_change,
        captured_at,
    })
}

/// Parse a base-10 decimal, rejecting non-finite results (overflow, `inf`,
/// `NaN` spellings).
fn parse_decimal(raw: &str, field: QuoteField) -> Result<f64, ParseError> {
    let err = || ParseError {
        field,
        raw: raw.to_string(),
    };
    let parsed: f64 = raw.trim().parse().map_err(|_| err())?;
    if !parsed.is_finite() {
        return Err(err());
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(link: &str, title: &str, value: &str, change: &str) -> RawRow {
        RawRow {
            link: link.to_string(),
            title: title.to_string(),
            value_text: value.to_string(),
            change_text: change.to_string(),
        }
    }

    #[test]
    fn parses_a_well_formed_row_exactly() {
        let now = Utc::now();
        let quote = parse_row(&raw("/quote/BTC-USD", "Bitcoin", "43000.12", "1.25"), now).unwrap();

        assert_eq!(quote.symbol, "BTC-USD");
        assert_eq!(quote.name, "Bitcoin");
        assert_eq!(quote.value, 43000.12);
        assert_eq!(quote.percent_change, 1.25);
        assert_eq!(quote.captured_at, now);
    }

    #[test]
    fn value_and_change_cells_map_to_their_own_fields() {
        let quote = parse_row(&raw("/quote/ETH-USD", "Ethereum", "2500.50", "-0.75"), Utc::now())
            .unwrap();
        assert_eq!(quote.value, 2500.50);
        assert_eq!(quote.percent_change, -0.75);
    }

    #[test]
    fn prefix_strip_is_idempotent() {
        assert_eq!(strip_symbol_prefix("/quote/BTC-USD"), "BTC-USD");
        assert_eq!(strip_symbol_prefix("BTC-USD"), "BTC-USD");
        assert_eq!(
            strip_symbol_prefix(strip_symbol_prefix("/quote/BTC-USD")),
            "BTC-USD"
        );
    }

    #[test]
    fn malformed_numerics_name_the_field_and_raw_value() {
        for bad in ["N/A", "", "12.3.4"] {
            let err = parse_row(&raw("/quote/X", "X", bad, "1.0"), Utc::now()).unwrap_err();
            assert_eq!(err.field, QuoteField::Value);
            assert_eq!(err.raw, bad);

            let err = parse_row(&raw("/quote/X", "X", "1.0", bad), Utc::now()).unwrap_err();
            assert_eq!(err.field, QuoteField::PercentChange);
            assert_eq!(err.raw, bad);
        }
    }

    #[test]
    fn non_finite_values_are_rejected() {
        for bad in ["inf", "-inf", "NaN", "1e999"] {
            let err = parse_row(&raw("/quote/X", "X", bad, "1.0"), Utc::now()).unwrap_err();
            assert_eq!(err.field, QuoteField::Value, "{bad} should not parse");
        }
    }

    #[test]
    fn bare_prefix_yields_an_empty_symbol_error() {
        let err = parse_row(&raw("/quote/", "X", "1.0", "1.0"), Utc::now()).unwrap_err();
        assert_eq!(err.field, QuoteField::Symbol);
    }

    #[test]
    fn quote_serializes_with_camel_case_field_names() {
        let quote = parse_row(&raw("/quote/BTC-USD", "Bitcoin", "43000.12", "1.25"), Utc::now())
            .unwrap();
        let json = serde_json::to_value(&quote).unwrap();
        let object = json.as_object().unwrap();

        assert!(object.contains_key("percentChange"));
        assert!(object.contains_key("capturedAt"));
        assert_eq!(object["value"], 43000.12);
    }
}
