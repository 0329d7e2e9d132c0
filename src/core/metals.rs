//! Precious metal prices derived from a USD-based rate table.
//!
//! The rate source quotes metals the same way as currencies: `table["XAU"]`
//! is how many troy ounces of gold one US dollar buys. Dividing any other
//! rate by it cancels the dollar and gives that currency's price of one ounce.

use crate::core::error::RateError;
use crate::core::rates::RateTable;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use tracing::{debug, info};

/// Grams per troy ounce.
pub const GRAMS_PER_TROY_OUNCE: f64 = 31.1034768;

/// Currency that metal views are anchored to.
pub const ANCHOR_CURRENCY: &str = "USD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metal {
    Gold,
    Silver,
}

impl Metal {
    pub fn code(&self) -> &'static str {
        match self {
            Metal::Gold => "XAU",
            Metal::Silver => "XAG",
        }
    }
}

impl Display for Metal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Metal::Gold => "Gold",
                Metal::Silver => "Silver",
            }
        )
    }
}

impl FromStr for Metal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GOLD" | "XAU" => Ok(Metal::Gold),
            "SILVER" | "XAG" => Ok(Metal::Silver),
            _ => Err(anyhow::anyhow!("Invalid metal: {}", s)),
        }
    }
}

/// Per-metal fallback prices in USD per troy ounce, used only when the live
/// table has no usable rate for the metal. `None` reports the metal as
/// unavailable instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetalFallback {
    pub gold: Option<f64>,
    pub silver: Option<f64>,
}

impl MetalFallback {
    pub fn usd_per_ounce(&self, metal: Metal) -> Option<f64> {
        match metal {
            Metal::Gold => self.gold,
            Metal::Silver => self.silver,
        }
        .filter(|price| price.is_finite() && *price > 0.0)
    }
}

/// Rates of one unit of `target` in every other currency of `anchored`.
///
/// Returns `None` if `anchored` has no positive, finite rate for `target`.
/// `target` itself is left out of the result.
pub fn derive_rates(anchored: &RateTable, target: &str) -> Option<RateTable> {
    let anchor = anchored
        .get(target)
        .filter(|rate| rate.is_finite() && *rate > 0.0)?;

    Some(
        anchored
            .iter()
            .filter(|(code, _)| *code != target)
            .map(|(code, rate)| (code, rate / anchor))
            .collect(),
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetalRates {
    pub metal: Metal,
    /// Price of one troy ounce in each currency.
    pub rates: RateTable,
    /// True when the rates come from the configured fallback price.
    pub approximate: bool,
}

/// Derives metal prices from a USD-based table, applying `fallback` when the
/// live table lacks the metal.
pub fn derive_metal_rates(
    usd_table: &RateTable,
    metal: Metal,
    fallback: &MetalFallback,
) -> Result<MetalRates, RateError> {
    if usd_table.is_empty() {
        return Err(RateError::NoData);
    }

    if let Some(rates) = derive_rates(usd_table, metal.code()) {
        return Ok(MetalRates {
            metal,
            rates,
            approximate: false,
        });
    }

    match fallback.usd_per_ounce(metal) {
        Some(usd_per_ounce) => {
            info!(%metal, usd_per_ounce, "Using fallback metal price");
            let mut anchored = usd_table.clone();
            anchored.insert(metal.code(), 1.0 / usd_per_ounce);
            // The fallback anchor is positive and finite, so this cannot miss
            let rates = derive_rates(&anchored, metal.code()).ok_or_else(|| {
                RateError::DerivationUnavailable(format!("invalid fallback for {metal}"))
            })?;
            Ok(MetalRates {
                metal,
                rates,
                approximate: true,
            })
        }
        None => {
            debug!(%metal, "No rate for metal in live table");
            Err(RateError::DerivationUnavailable(format!(
                "no {} rate for {}",
                ANCHOR_CURRENCY,
                metal.code()
            )))
        }
    }
}

/// Converts a per-ounce price to a per-gram price.
pub fn per_gram(price_per_troy_ounce: f64) -> f64 {
    price_per_troy_ounce / GRAMS_PER_TROY_OUNCE
}
