use super::ui::{self, StyleType};
use crate::core::currency::{display_name, is_valid_code, normalize_code};
use crate::{AppContext, FavoritesAction};
use anyhow::{Result, bail};
use comfy_table::Cell;

pub fn run(ctx: &AppContext, action: FavoritesAction) -> Result<()> {
    let mut favorites = ctx.favorites()?;

    match action {
        FavoritesAction::List => {
            if favorites.favorites().is_empty() {
                println!("{}", ui::style_text("No favorites yet", StyleType::Subtle));
                return Ok(());
            }
            let mut codes = favorites.favorites().to_vec();
            codes.sort();

            let mut table = ui::new_styled_table();
            table.set_header(vec![ui::header_cell("Code"), ui::header_cell("Name")]);
            for code in &codes {
                table.add_row(vec![Cell::new(code), Cell::new(display_name(code))]);
            }
            println!("{table}");
        }
        FavoritesAction::Toggle(code) => {
            let code = normalize_code(&code);
            if !is_valid_code(&code) {
                bail!("Invalid currency code: {code}");
            }
            let message = if favorites.toggle_favorite(&code)? {
                format!("Added {code} to favorites")
            } else {
                format!("Removed {code} from favorites")
            };
            println!("{}", ui::style_text(&message, StyleType::TotalLabel));
        }
    }
    Ok(())
}
