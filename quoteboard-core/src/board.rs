//! The board — the run's aggregate structure: table name → symbol → quote.
//!
//! Buckets are created lazily on first insert; a symbol already present in a
//! bucket is overwritten (last write wins). BTreeMaps keep the serialized
//! snapshot deterministically ordered.

use crate::quote::Quote;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    tables: BTreeMap<String, BTreeMap<String, Quote>>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a quote under `tables[table][quote.symbol]`, creating the
    /// bucket if needed. Returns the replaced quote, if any.
    pub fn insert(&mut self, table: &str, quote: Quote) -> Option<Quote> {
        self.tables
            .entry(table.to_string())
            .or_default()
            .insert(quote.symbol.clone(), quote)
    }

    pub fn table(&self, name: &str) -> Option<&BTreeMap<String, Quote>> {
        self.tables.get(name)
    }

    pub fn get(&self, table: &str, symbol: &str) -> Option<&Quote> {
        self.tables.get(table).and_then(|bucket| bucket.get(symbol))
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Total quotes across all tables.
    pub fn len(&self) -> usize {
        self.tables.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
