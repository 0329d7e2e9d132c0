use super::rates::{RateRow, rate_rows, rows_table};
use super::ui::{self, StyleType};
use crate::AppContext;
use crate::core::format::format_rate;
use crate::core::metals::{ANCHOR_CURRENCY, Metal, MetalRates, derive_metal_rates, per_gram};
use anyhow::Result;

/// Shows the price of one troy ounce (or gram) of `metal` in every currency.
pub async fn run(ctx: &AppContext, metal: Metal, query: Option<&str>, grams: bool) -> Result<()> {
    let favorites = ctx.favorites()?;

    let spinner = ui::new_spinner(&format!("Loading {metal} prices..."));
    let snapshot = ctx.manager.get_rates(ANCHOR_CURRENCY).await;
    spinner.finish_and_clear();

    ui::print_status(&snapshot);
    if !snapshot.has_data() {
        return Ok(());
    }

    let metal_rates = match derive_metal_rates(&snapshot.rates, metal, &ctx.config.metal_fallback) {
        Ok(metal_rates) => metal_rates,
        Err(e) => {
            println!("{}", ui::style_text(&e.to_string(), StyleType::Error));
            return Ok(());
        }
    };

    let rows = metal_rows(&metal_rates, query.unwrap_or(""), grams, |c| {
        favorites.is_favorite(c)
    });
    if rows.is_empty() {
        println!("{}", ui::style_text("No matching currencies", StyleType::Subtle));
        return Ok(());
    }

    println!("\n{}", ui::style_text(&title(&metal_rates, grams), StyleType::Title));
    println!("{}", rows_table("Price", &rows, format_rate));
    Ok(())
}

fn title(metal_rates: &MetalRates, grams: bool) -> String {
    let unit = if grams { "gram" } else { "troy ounce" };
    let mut title = format!("{} price per {}", metal_rates.metal, unit);
    if metal_rates.approximate {
        title.push_str(" (approximate)");
    }
    title
}

/// Price rows for a derived metal table, optionally converted to per gram.
pub fn metal_rows<F>(metal_rates: &MetalRates, query: &str, grams: bool, is_favorite: F) -> Vec<RateRow>
where
    F: Fn(&str) -> bool,
{
    let mut rows = rate_rows(&metal_rates.rates, metal_rates.metal.code(), query, is_favorite);
    if grams {
        for row in &mut rows {
            row.value = per_gram(row.value);
        }
    }
    rows
}
