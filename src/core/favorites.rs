//! Persisted set of favorite currency codes.

use crate::core::cache::{self, KeyValueStore};
use crate::core::currency::normalize_code;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

pub const FAVORITES_KEY: &str = "currency_favorites";
const FAVORITES_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum FavoritesRecord {
    Versioned { version: u32, codes: Vec<String> },
    /// Bare array written by earlier builds.
    Legacy(Vec<String>),
}

impl FavoritesRecord {
    fn into_codes(self) -> Option<Vec<String>> {
        match self {
            FavoritesRecord::Versioned { version, codes } if version == FAVORITES_VERSION => {
                Some(codes)
            }
            FavoritesRecord::Versioned { version, .. } => {
                warn!(version, "Ignoring favorites with unknown version");
                None
            }
            FavoritesRecord::Legacy(codes) => Some(codes),
        }
    }
}

/// Membership is what matters; the stored order carries no meaning.
pub struct FavoritesRegistry {
    store: Arc<dyn KeyValueStore>,
    codes: Vec<String>,
}

impl FavoritesRegistry {
    /// Loads favorites from `store`, seeding and persisting `defaults` when
    /// nothing usable is stored.
    pub fn load(store: Arc<dyn KeyValueStore>, defaults: &[String]) -> Result<Self> {
        let stored = cache::read_json::<FavoritesRecord>(store.as_ref(), FAVORITES_KEY)
            .and_then(FavoritesRecord::into_codes);

        let (codes, seeded) = match stored {
            Some(codes) => (dedup(codes), false),
            None => (dedup(defaults.to_vec()), true),
        };

        let registry = Self { store, codes };
        if seeded {
            debug!(codes = ?registry.codes, "Seeding default favorites");
            registry.persist()?;
        }
        Ok(registry)
    }

    pub fn favorites(&self) -> &[String] {
        &self.codes
    }

    pub fn is_favorite(&self, code: &str) -> bool {
        let code = normalize_code(code);
        self.codes.contains(&code)
    }

    /// Adds `code` if absent, removes it if present, and writes through.
    /// Returns whether `code` is a favorite afterwards.
    pub fn toggle_favorite(&mut self, code: &str) -> Result<bool> {
        let code = normalize_code(code);
        let now_favorite = match self.codes.iter().position(|c| *c == code) {
            Some(index) => {
                self.codes.remove(index);
                false
            }
            None => {
                self.codes.push(code.clone());
                true
            }
        };
        self.persist()?;
        debug!(code = %code, now_favorite, "Toggled favorite");
        Ok(now_favorite)
    }

    fn persist(&self) -> Result<()> {
        let record = FavoritesRecord::Versioned {
            version: FAVORITES_VERSION,
            codes: self.codes.clone(),
        };
        cache::write_json(self.store.as_ref(), FAVORITES_KEY, &record)
    }
}

fn dedup(codes: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(codes.len());
    for code in codes {
        let code = normalize_code(&code);
        if !unique.contains(&code) {
            unique.push(code);
        }
    }
    unique
}
