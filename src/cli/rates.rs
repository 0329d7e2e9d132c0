use super::ui::{self, StyleType};
use crate::AppContext;
use crate::core::currency::{display_name, normalize_code};
use crate::core::format::format_rate;
use crate::core::ranking::rank;
use crate::core::rates::RateTable;
use anyhow::Result;
use comfy_table::{Cell, Table};

#[derive(Debug, Clone, PartialEq)]
pub struct RateRow {
    pub code: String,
    pub name: &'static str,
    pub value: f64,
    pub is_favorite: bool,
}

/// Rows of `table` in display order. `exclude` (usually the base itself) is
/// left out.
pub fn rate_rows<F>(table: &RateTable, exclude: &str, query: &str, is_favorite: F) -> Vec<RateRow>
where
    F: Fn(&str) -> bool,
{
    let candidates: Vec<String> = table
        .codes()
        .into_iter()
        .filter(|code| code != exclude)
        .collect();

    rank(&candidates, query, &is_favorite, display_name)
        .into_iter()
        .filter_map(|code| {
            let value = table.get(&code)?;
            Some(RateRow {
                name: display_name(&code),
                is_favorite: is_favorite(&code),
                value,
                code,
            })
        })
        .collect()
}

pub fn rows_table(value_header: &str, rows: &[RateRow], format_value: impl Fn(f64) -> String) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell(""),
        ui::header_cell("Code"),
        ui::header_cell("Name"),
        ui::header_cell(value_header),
    ]);
    for row in rows {
        table.add_row(vec![
            ui::favorite_cell(row.is_favorite),
            Cell::new(&row.code),
            Cell::new(row.name),
            ui::value_cell(format_value(row.value)),
        ]);
    }
    table
}

/// Lists every rate for `base`, favorites first unless `query` filters.
pub async fn run(ctx: &AppContext, base: Option<&str>, query: Option<&str>) -> Result<()> {
    let base = normalize_code(base.unwrap_or(&ctx.config.base_currency));
    let favorites = ctx.favorites()?;

    let spinner = ui::new_spinner(&format!("Loading {base} rates..."));
    let snapshot = ctx.manager.get_rates(&base).await;
    spinner.finish_and_clear();

    ui::print_status(&snapshot);
    if !snapshot.has_data() {
        return Ok(());
    }

    let rows = rate_rows(&snapshot.rates, &base, query.unwrap_or(""), |c| {
        favorites.is_favorite(c)
    });
    if rows.is_empty() {
        println!("{}", ui::style_text("No matching currencies", StyleType::Subtle));
        return Ok(());
    }

    println!(
        "\n{}",
        ui::style_text(&format!("1 {base} in other currencies"), StyleType::Title)
    );
    println!("{}", rows_table("Rate", &rows, format_rate));
    Ok(())
}
