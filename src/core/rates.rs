//! Rate tables, their cached form and the rate source abstraction.

use crate::core::cache::{self, KeyValueStore};
use crate::core::currency::{is_valid_code, normalize_code};
use crate::core::error::RateError;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Rates relative to one implicit base currency. Every value is finite and
/// positive; invalid pairs are dropped on construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct RateTable(BTreeMap<String, f64>);

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a rate, returning false if the pair was rejected.
    pub fn insert(&mut self, code: &str, rate: f64) -> bool {
        let code = normalize_code(code);
        if !is_valid_code(&code) || !rate.is_finite() || rate <= 0.0 {
            debug!(code = %code, rate, "Dropping invalid rate");
            return false;
        }
        self.0.insert(code, rate);
        true
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.0.get(code).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// An empty table means "no data", never "all rates are zero".
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(c, r)| (c.as_str(), *r))
    }

    /// Codes in ascending order.
    pub fn codes(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    /// Converts `amount` of the base currency into `to`.
    pub fn convert(&self, amount: f64, to: &str) -> Option<f64> {
        self.get(to).map(|rate| amount * rate)
    }
}

impl From<BTreeMap<String, f64>> for RateTable {
    fn from(raw: BTreeMap<String, f64>) -> Self {
        raw.into_iter().collect()
    }
}

impl From<RateTable> for BTreeMap<String, f64> {
    fn from(table: RateTable) -> Self {
        table.0
    }
}

impl<S: AsRef<str>> FromIterator<(S, f64)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut table = RateTable::new();
        for (code, rate) in iter {
            table.insert(code.as_ref(), rate);
        }
        table
    }
}

pub const CACHE_ENTRY_VERSION: u32 = 1;

fn current_version() -> u32 {
    CACHE_ENTRY_VERSION
}

/// Persisted form of a fetched table. Records from builds that predate the
/// version field deserialize as version 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(default = "current_version")]
    pub version: u32,
    pub rates: RateTable,
    /// Epoch milliseconds of the fetch.
    pub timestamp: i64,
}

impl CacheEntry {
    pub fn new(rates: RateTable, fetched_at: DateTime<Utc>) -> Self {
        Self {
            version: CACHE_ENTRY_VERSION,
            rates,
            timestamp: fetched_at.timestamp_millis(),
        }
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

pub fn cache_key(base: &str) -> String {
    format!("currency_rates_{base}")
}

/// Reads the cached table for `base`. Unknown versions are treated as absent.
pub fn load_cached(store: &dyn KeyValueStore, base: &str) -> Option<CacheEntry> {
    let entry: CacheEntry = cache::read_json(store, &cache_key(base))?;
    if entry.version != CACHE_ENTRY_VERSION {
        warn!(
            base,
            version = entry.version,
            "Ignoring cache entry with unknown version"
        );
        return None;
    }
    Some(entry)
}

/// Overwrites the cached table for `base`.
pub fn store_cached(store: &dyn KeyValueStore, base: &str, entry: &CacheEntry) -> Result<()> {
    cache::write_json(store, &cache_key(base), entry)
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches the latest table with `base` as the base currency.
    async fn fetch_rates(&self, base: &str) -> Result<RateTable, RateError>;
}
