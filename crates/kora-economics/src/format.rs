//! Currency display formatting
//!
//! Deterministic, locale-stable formatting: thousands separated by
//! commas, zero fraction digits, currency symbol prefixed. Matches the
//! wallet surface's observed `{symbol}{grouped integer}` rendering.

use crate::constants::CURRENCY_SYMBOLS;

/// Format an amount for display in the given currency
///
/// The amount is rounded half-away-from-zero to whole currency units.
/// Unknown currency codes fall back to the bare code as prefix
/// (e.g. `XYZ 1,234`).
pub fn format_currency(amount: f64, currency: &str) -> String {
    let symbol = CURRENCY_SYMBOLS
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(currency))
        .map(|(_, sym)| (*sym).to_string())
        .unwrap_or_else(|| format!("{} ", currency.to_ascii_uppercase()));

    let rounded = if amount.is_finite() { amount.round() } else { 0.0 };
    let negative = rounded < 0.0;
    let grouped = group_thousands(rounded.abs() as u128);

    if negative {
        format!("-{}{}", symbol, grouped)
    } else {
        format!("{}{}", symbol, grouped)
    }
}

fn group_thousands(mut value: u128) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut groups = Vec::new();
    while value > 0 {
        groups.push((value % 1000) as u16);
        value /= 1000;
    }
    let mut out = String::new();
    for (i, group) in groups.iter().rev().enumerate() {
        if i == 0 {
            out.push_str(&group.to_string());
        } else {
            out.push_str(&format!(",{:03}", group));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ngn_formatting() {
        assert_eq!(format_currency(32_800.0, "NGN"), "\u{20a6}32,800");
        assert_eq!(format_currency(89.9, "NGN"), "\u{20a6}90");
    }

    #[test]
    fn test_usd_formatting() {
        assert_eq!(format_currency(1_234_567.0, "USD"), "$1,234,567");
        assert_eq!(format_currency(0.0, "USD"), "$0");
    }

    #[test]
    fn test_negative_amounts() {
        assert_eq!(format_currency(-1_500.0, "USD"), "-$1,500");
    }

    #[test]
    fn test_unknown_currency_uses_code() {
        assert_eq!(format_currency(1_000.0, "xyz"), "XYZ 1,000");
    }

    #[test]
    fn test_formatting_is_deterministic() {
        let a = format_currency(2_733.4, "NGN");
        let b = format_currency(2_733.4, "NGN");
        assert_eq!(a, b);
        assert_eq!(a, "\u{20a6}2,733");
    }

    #[test]
    fn test_non_finite_renders_zero() {
        assert_eq!(format_currency(f64::NAN, "USD"), "$0");
    }
}
