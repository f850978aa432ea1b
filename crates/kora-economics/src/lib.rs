//! # Kora Economics - Rates & Earnings Projection
//!
//! Conversion rates and projected staking yield for the wallet surface.
//!
//! ## Model
//!
//! All projections are simple interest off a published APY:
//!
//! ```text
//! token_amount = principal / price(currency)
//! yearly       = token_amount x apy/100 x (1 - fee)   [in tokens]
//! yearly_fiat  = yearly x price(currency)
//! daily_fiat   = yearly_fiat / 365
//! monthly_fiat = yearly_fiat / 12
//! ```
//!
//! The token price is a fixed reference constant and the per-currency
//! multipliers are a static table; there is no live feed. Swapping in an
//! oracle means replacing [`RateProvider`] only.
//!
//! ## Supported display currencies
//!
//! | Code | Multiplier vs USD |
//! |------|-------------------|
//! | USD | 1.0 |
//! | NGN | 1,526.0 |
//! | KES | 129.0 |
//! | GHS | 15.6 |
//! | ZAR | 18.2 |
//! | EUR | 0.92 |
//! | GBP | 0.79 |

pub mod estimator;
pub mod format;
pub mod rates;

// Re-exports
pub use estimator::{EarningsEstimator, EarningsProjection};
pub use format::format_currency;
pub use rates::RateProvider;

/// Token and rate constants
pub mod constants {
    /// Staked asset symbol
    pub const TOKEN_SYMBOL: &str = "KOR";

    /// Token name
    pub const TOKEN_NAME: &str = "Kora Staking Token";

    /// Decimal places (ETH-like)
    pub const TOKEN_DECIMALS: u8 = 18;

    /// One token in smallest native unit
    pub const ONE_TOKEN: u128 = 1_000_000_000_000_000_000; // 10^18

    /// Reference token price in USD (static, not live-fetched)
    pub const TOKEN_PRICE_USD: f64 = 7.22;

    /// Static conversion multipliers against USD, by currency code
    pub const CURRENCY_MULTIPLIERS: &[(&str, f64)] = &[
        ("USD", 1.0),
        ("NGN", 1526.0),
        ("KES", 129.0),
        ("GHS", 15.6),
        ("ZAR", 18.2),
        ("EUR", 0.92),
        ("GBP", 0.79),
    ];

    /// Currency symbols for display formatting
    pub const CURRENCY_SYMBOLS: &[(&str, &str)] = &[
        ("USD", "$"),
        ("NGN", "\u{20a6}"),
        ("KES", "KSh "),
        ("GHS", "GH\u{20b5}"),
        ("ZAR", "R"),
        ("EUR", "\u{20ac}"),
        ("GBP", "\u{a3}"),
    ];

    /// Days used for the daily projection
    pub const DAYS_PER_YEAR: f64 = 365.0;

    /// Months used for the monthly projection
    pub const MONTHS_PER_YEAR: f64 = 12.0;
}

pub use constants::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_token() {
        assert_eq!(ONE_TOKEN, 10u128.pow(TOKEN_DECIMALS as u32));
    }

    #[test]
    fn test_multiplier_table_has_usd_base() {
        let usd = CURRENCY_MULTIPLIERS
            .iter()
            .find(|(code, _)| *code == "USD")
            .unwrap();
        assert_eq!(usd.1, 1.0);
    }
}
