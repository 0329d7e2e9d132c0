use super::ui::{self, StyleType};
use crate::AppContext;
use crate::core::currency::{is_valid_code, normalize_code};
use crate::core::format::{format_amount, format_rate};
use crate::core::rate_manager::RateSnapshot;
use anyhow::{Result, bail};

/// Converts `amount` between two currencies, defaulting to the configured
/// pair. Cached rates are shown when the network is unavailable.
pub async fn run(
    ctx: &AppContext,
    amount: f64,
    from: Option<&str>,
    to: Option<&str>,
    swap: bool,
) -> Result<()> {
    let mut from = normalize_code(from.unwrap_or(&ctx.config.base_currency));
    let mut to = normalize_code(to.unwrap_or(&ctx.config.target_currency));
    if swap {
        std::mem::swap(&mut from, &mut to);
    }

    for code in [&from, &to] {
        if !is_valid_code(code) {
            bail!("Invalid currency code: {code}");
        }
    }
    if !amount.is_finite() || amount < 0.0 {
        bail!("Amount must be a non-negative number, got {amount}");
    }

    let spinner = ui::new_spinner(&format!("Loading {from} rates..."));
    let snapshot = ctx.manager.get_rates(&from).await;
    spinner.finish_and_clear();

    ui::print_status(&snapshot);
    if let Some(lines) = render_conversion(&snapshot, amount, &to) {
        for line in lines {
            println!("{line}");
        }
    }
    Ok(())
}

/// Result and rate lines, or `None` when there is nothing to convert with.
pub fn render_conversion(snapshot: &RateSnapshot, amount: f64, to: &str) -> Option<Vec<String>> {
    if !snapshot.has_data() {
        return None;
    }

    let lines = match (
        snapshot.rates.convert(amount, to),
        snapshot.rates.get(to),
    ) {
        (Some(result), Some(rate)) => vec![
            format!(
                "{} = {}",
                ui::style_text(&format_amount(amount, &snapshot.base), StyleType::TotalLabel),
                ui::style_text(&format_amount(result, to), StyleType::TotalValue)
            ),
            ui::style_text(
                &format!("1 {} = {} {}", snapshot.base, format_rate(rate), to),
                StyleType::Subtle,
            ),
        ],
        _ => vec![ui::style_text(
            &format!("No {} rate for {}", snapshot.base, to),
            StyleType::Error,
        )],
    };
    Some(lines)
}
