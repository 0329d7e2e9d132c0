//! Amount formatting for display.

fn symbol(code: &str) -> Option<&'static str> {
    match code {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "INR" => Some("₹"),
        "JPY" => Some("¥"),
        _ => None,
    }
}

/// Groups the integer part of an already rounded, non-negative number.
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Formats `amount` with two decimals and thousands separators, e.g.
/// `$1,234.50` or `CHF 12.00`. Non-finite amounts format as `0.00`.
pub fn format_amount(amount: f64, code: &str) -> String {
    if !amount.is_finite() {
        return "0.00".to_string();
    }

    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    // "-0.00" reads oddly, drop the sign when the rounded value is zero
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    let number = format!("{}.{}", group_thousands(int_part), frac_part);

    match symbol(code) {
        Some(sym) => format!("{sign}{sym}{number}"),
        None => format!("{sign}{code} {number}"),
    }
}

/// Formats a rate with four decimals.
pub fn format_rate(rate: f64) -> String {
    format!("{rate:.4}")
}
