//! Table descriptors — which page modules to scrape and the CSS selectors
//! that locate their rows.
//!
//! A `TableSpec` carries pre-rendered selector strings and is passed into the
//! capture routine explicitly; nothing here is global state. The built-in set
//! targets the three market-mover modules on the Yahoo Finance landing page,
//! and a custom set can be loaded from a TOML file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// One named table and the selectors that locate its rows and cells.
///
/// `row_selector` matches one element per instrument row. The three cell
/// selectors are evaluated *relative to* each row element, which is what
/// guarantees the symbol/value/change streams stay index-aligned: there is
/// exactly one ordered row list, never three independently fetched ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    /// Table identifier, used as the top-level key in the output snapshot.
    pub name: String,
    /// Selector matching one element per instrument row.
    pub row_selector: String,
    /// Relative selector for the first-column link (symbol href + title).
    pub link_selector: String,
    /// Relative selector for the quote-value stream cell.
    pub value_selector: String,
    /// Relative selector for the percent-change stream cell.
    pub change_selector: String,
}

impl TableSpec {
    /// Render the selector set for a Yahoo-style applet module section.
    ///
    /// Rows live under `section[data-yaft-module="tdv2-applet-{name}"]`;
    /// the first cell holds the quote link, the second the value stream,
    /// the last the change stream.
    pub fn for_module(name: &str) -> Self {
        let container = format!(r#"section[data-yaft-module="tdv2-applet-{name}"]"#);
        Self {
            name: name.to_string(),
            row_selector: format!("{container} > table > tbody > tr"),
            link_selector: "td:first-child > a".to_string(),
            value_selector: "td:nth-child(2) > fin-streamer".to_string(),
            change_selector: "td:last-child > fin-streamer".to_string(),
        }
    }
}

/// The built-in table set: cryptocurrencies, top gainers, top losers,
/// in that order.
pub fn default_tables() -> Vec<TableSpec> {
    ["crypto_currencies", "gainers_title", "losers_title"]
        .into_iter()
        .map(TableSpec::for_module)
        .collect()
}

/// One entry in a TOML table-set file: either a module shorthand or a fully
/// custom selector set.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TableEntry {
    /// `module = "crypto_currencies"` — expands via [`TableSpec::for_module`].
    Module { module: String },
    /// Explicit selectors for a table that doesn't follow the module layout.
    Custom(TableSpec),
}

/// TOML-loadable table set, mirroring the `[[tables]]` array-of-tables shape.
#[derive(Debug, Clone, Deserialize)]
pub struct TableSetConfig {
    pub tables: Vec<TableEntry>,
}

#[derive(Debug, Error)]
pub enum TableConfigError {
    #[error("failed to read table set file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse table set file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("table set file declares no tables")]
    Empty,
}

impl TableSetConfig {
    /// Load a table set from a TOML file and expand it into specs.
    pub fn load(path: &Path) -> Result<Vec<TableSpec>, TableConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: TableSetConfig = toml::from_str(&text)?;
        if config.tables.is_empty() {
            return Err(TableConfigError::Empty);
        }
        Ok(config.into_specs())
    }

    /// Expand entries into concrete specs, preserving declaration order.
    pub fn into_specs(self) -> Vec<TableSpec> {
        self.tables
            .into_iter()
            .map(|entry| match entry {
                TableEntry::Module { module } => TableSpec::for_module(&module),
                TableEntry::Custom(spec) => spec,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_selectors_are_scoped_to_the_applet_section() {
        let spec = TableSpec::for_module("crypto_currencies");
        assert_eq!(spec.name, "crypto_currencies");
        assert_eq!(
            spec.row_selector,
            r#"section[data-yaft-module="tdv2-applet-crypto_currencies"] > table > tbody > tr"#
        );
        assert_eq!(spec.link_selector, "td:first-child > a");
        assert_eq!(spec.value_selector, "td:nth-child(2) > fin-streamer");
        assert_eq!(spec.change_selector, "td:last-child > fin-streamer");
    }

    #[test]
    fn default_set_is_crypto_gainers_losers_in_order() {
        let names: Vec<String> = default_tables().into_iter().map(|t| t.name).collect();
        assert_eq!(names, ["crypto_currencies", "gainers_title", "losers_title"]);
    }

    #[test]
    fn toml_set_mixes_module_shorthand_and_custom_specs() {
        let toml_text = r#"
            [[tables]]
            module = "gainers_title"

            [[tables]]
            name = "watchlist"
            row_selector = "div.watchlist > ul > li"
            link_selector = "a.sym"
            value_selector = "span.px"
            change_selector = "span.chg"
        "#;
        let config: TableSetConfig = toml::from_str(toml_text).unwrap();
        let specs = config.into_specs();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0], TableSpec::for_module("gainers_title"));
        assert_eq!(specs[1].name, "watchlist");
        assert_eq!(specs[1].row_selector, "div.watchlist > ul > li");
    }

    #[test]
    fn empty_table_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.toml");
        std::fs::write(&path, "tables = []\n").unwrap();
        assert!(matches!(
            TableSetConfig::load(&path),
            Err(TableConfigError::Empty)
        ));
    }
}
