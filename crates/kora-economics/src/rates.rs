//! Static rate table
//!
//! Maps a display-currency code to the token price expressed in that
//! currency. Unknown codes fall back to USD.

use crate::constants::*;

/// Provider of token prices per display currency
///
/// Deliberately static: a handful of fixed multipliers over a fixed
/// reference price, refreshed only by shipping new constants. A live
/// oracle would implement the same two methods.
#[derive(Clone, Copy, Debug, Default)]
pub struct RateProvider;

impl RateProvider {
    pub fn new() -> Self {
        Self
    }

    /// Conversion multiplier against USD for a currency code
    ///
    /// Unknown currency falls back to the USD multiplier (1.0).
    pub fn multiplier(&self, currency: &str) -> f64 {
        CURRENCY_MULTIPLIERS
            .iter()
            .find(|(code, _)| code.eq_ignore_ascii_case(currency))
            .map(|(_, m)| *m)
            .unwrap_or(1.0)
    }

    /// Token price expressed in the given display currency
    pub fn token_price(&self, currency: &str) -> f64 {
        TOKEN_PRICE_USD * self.multiplier(currency)
    }

    /// Convert a display-currency amount to native token units (10^18)
    ///
    /// Non-finite or non-positive amounts convert to zero.
    pub fn to_native_units(&self, amount: f64, currency: &str) -> u128 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0;
        }
        let tokens = amount / self.token_price(currency);
        (tokens * ONE_TOKEN as f64) as u128
    }

    /// Convert native token units back to a display-currency amount
    pub fn from_native_units(&self, units: u128, currency: &str) -> f64 {
        (units as f64 / ONE_TOKEN as f64) * self.token_price(currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usd_price_is_reference() {
        let rates = RateProvider::new();
        assert_eq!(rates.token_price("USD"), TOKEN_PRICE_USD);
    }

    #[test]
    fn test_ngn_price() {
        let rates = RateProvider::new();
        let price = rates.token_price("NGN");
        assert!((price - 11017.72).abs() < 1.0); // 7.22 * 1526
    }

    #[test]
    fn test_unknown_currency_falls_back_to_usd() {
        let rates = RateProvider::new();
        assert_eq!(rates.token_price("XYZ"), rates.token_price("USD"));
    }

    #[test]
    fn test_currency_code_case_insensitive() {
        let rates = RateProvider::new();
        assert_eq!(rates.token_price("ngn"), rates.token_price("NGN"));
    }

    #[test]
    fn test_native_unit_round_trip() {
        let rates = RateProvider::new();
        let units = rates.to_native_units(50_000.0, "NGN");
        let back = rates.from_native_units(units, "NGN");
        assert!((back - 50_000.0).abs() < 0.01);
    }

    #[test]
    fn test_invalid_amounts_convert_to_zero() {
        let rates = RateProvider::new();
        assert_eq!(rates.to_native_units(0.0, "USD"), 0);
        assert_eq!(rates.to_native_units(-5.0, "USD"), 0);
        assert_eq!(rates.to_native_units(f64::NAN, "USD"), 0);
    }
}
