use crate::core::rate_manager::RateSnapshot;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    TotalValue,
    Warning,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Warning => style(text).yellow(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Right aligned numeric cell.
pub fn value_cell(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Marker cell for favorite currencies.
pub fn favorite_cell(is_favorite: bool) -> Cell {
    if is_favorite {
        Cell::new("★").fg(Color::Yellow)
    } else {
        Cell::new("")
    }
}

/// Status lines for a snapshot: offline banner, freshness and the last error.
pub fn status_lines(snapshot: &RateSnapshot) -> Vec<String> {
    let mut lines = Vec::new();
    if snapshot.is_offline {
        lines.push(style_text(
            "Offline: showing cached rates",
            StyleType::Warning,
        ));
    }
    if let Some(updated) = snapshot.last_updated_display() {
        lines.push(style_text(
            &format!("Rates for {} updated {}", snapshot.base, updated),
            StyleType::Subtle,
        ));
    }
    if let Some(error) = &snapshot.error {
        lines.push(style_text(&format!("Error: {error}"), StyleType::Error));
    }
    lines
}

pub fn print_status(snapshot: &RateSnapshot) {
    for line in status_lines(snapshot) {
        println!("{line}");
    }
}

/// Creates a spinner shown while rates load. Hidden when stderr is not a
/// terminal.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}")
    {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Prints a separator line matching the terminal width.
pub fn print_separator() {
    let term_width = console::Term::stdout()
        .size_checked()
        .map(|(_, w)| w as usize)
        .unwrap_or(80);
    println!("\n{}", "─".repeat(term_width));
}
