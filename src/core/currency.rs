//! Static currency metadata.

/// Display names keyed by ISO code, sorted by code.
const CURRENCY_NAMES: &[(&str, &str)] = &[
    ("AED", "UAE Dirham"),
    ("ARS", "Argentine Peso"),
    ("AUD", "Australian Dollar"),
    ("BDT", "Bangladeshi Taka"),
    ("BRL", "Brazilian Real"),
    ("CAD", "Canadian Dollar"),
    ("CHF", "Swiss Franc"),
    ("CLP", "Chilean Peso"),
    ("CNY", "Chinese Yuan"),
    ("COP", "Colombian Peso"),
    ("CZK", "Czech Koruna"),
    ("DKK", "Danish Krone"),
    ("EGP", "Egyptian Pound"),
    ("EUR", "Euro"),
    ("GBP", "British Pound"),
    ("HKD", "Hong Kong Dollar"),
    ("HUF", "Hungarian Forint"),
    ("IDR", "Indonesian Rupiah"),
    ("ILS", "Israeli New Shekel"),
    ("INR", "Indian Rupee"),
    ("JPY", "Japanese Yen"),
    ("KES", "Kenyan Shilling"),
    ("KRW", "South Korean Won"),
    ("KWD", "Kuwaiti Dinar"),
    ("LKR", "Sri Lankan Rupee"),
    ("MXN", "Mexican Peso"),
    ("MYR", "Malaysian Ringgit"),
    ("NGN", "Nigerian Naira"),
    ("NOK", "Norwegian Krone"),
    ("NPR", "Nepalese Rupee"),
    ("NZD", "New Zealand Dollar"),
    ("PHP", "Philippine Peso"),
    ("PKR", "Pakistani Rupee"),
    ("PLN", "Polish Zloty"),
    ("QAR", "Qatari Riyal"),
    ("RUB", "Russian Ruble"),
    ("SAR", "Saudi Riyal"),
    ("SEK", "Swedish Krona"),
    ("SGD", "Singapore Dollar"),
    ("THB", "Thai Baht"),
    ("TRY", "Turkish Lira"),
    ("TWD", "New Taiwan Dollar"),
    ("UAH", "Ukrainian Hryvnia"),
    ("USD", "US Dollar"),
    ("VND", "Vietnamese Dong"),
    ("XAG", "Silver (troy ounce)"),
    ("XAU", "Gold (troy ounce)"),
    ("ZAR", "South African Rand"),
];

/// Human readable name for `code`, or an empty string for unknown codes.
pub fn display_name(code: &str) -> &'static str {
    CURRENCY_NAMES
        .binary_search_by(|(c, _)| (*c).cmp(code))
        .map(|i| CURRENCY_NAMES[i].1)
        .unwrap_or("")
}

/// Every code with a known display name, in ascending order.
pub fn known_codes() -> Vec<String> {
    CURRENCY_NAMES.iter().map(|(code, _)| code.to_string()).collect()
}

/// True for 3-4 letter uppercase ASCII codes.
pub fn is_valid_code(code: &str) -> bool {
    (3..=4).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_uppercase())
}

/// Trims and uppercases user input into a currency code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_sorted_for_lookup() {
        assert!(CURRENCY_NAMES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("INR"), "Indian Rupee");
        assert_eq!(display_name("XAU"), "Gold (troy ounce)");
        assert_eq!(display_name("ZZZ"), "");
    }

    #[test]
    fn test_known_codes_have_names() {
        let codes = known_codes();
        assert_eq!(codes.len(), CURRENCY_NAMES.len());
        assert!(codes.iter().all(|c| !display_name(c).is_empty()));
    }

    #[test]
    fn test_code_validation() {
        assert!(is_valid_code("USD"));
        assert!(is_valid_code("USDT"));
        assert!(!is_valid_code("usd"));
        assert!(!is_valid_code("US"));
        assert!(!is_valid_code("EURO1"));
        assert_eq!(normalize_code(" eur "), "EUR");
    }
}
