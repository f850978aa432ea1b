//! Earnings estimator
//!
//! Pure projection of staking yield from a principal, an orchestrator's
//! published APY, and its fee. Recomputed on every input change by the
//! wallet surface, so it must never fail: bad input degrades to the
//! all-zero projection.

use crate::constants::*;
use crate::rates::RateProvider;
use serde::{Deserialize, Serialize};

/// Projected earnings for a candidate delegation
///
/// Fiat fields are in the display currency the projection was requested
/// in; `token_amount` is the principal expressed in staked tokens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EarningsProjection {
    /// Principal in staked tokens
    pub token_amount: f64,

    /// Projected yield per day, display currency
    pub daily: f64,

    /// Projected yield per month, display currency
    pub monthly: f64,

    /// Projected yield per year, display currency
    pub yearly: f64,
}

impl EarningsProjection {
    /// The disabled/zero state (no orchestrator selected, bad input)
    pub const ZERO: Self = Self {
        token_amount: 0.0,
        daily: 0.0,
        monthly: 0.0,
        yearly: 0.0,
    };
}

/// Computes projected staking earnings
#[derive(Clone, Copy, Debug, Default)]
pub struct EarningsEstimator {
    rates: RateProvider,
}

impl EarningsEstimator {
    pub fn new(rates: RateProvider) -> Self {
        Self { rates }
    }

    /// Project daily/monthly/yearly yield for a principal
    ///
    /// `principal` is in the display currency, `apy_percent` is the
    /// orchestrator's published APY (e.g. 65.6), `fee_fraction` is the
    /// orchestrator's cut of rewards in 0..=1.
    ///
    /// Non-finite or non-positive principal, negative APY, or a fee
    /// outside 0..=1 all yield [`EarningsProjection::ZERO`]; no error is
    /// raised.
    pub fn project(
        &self,
        principal: f64,
        apy_percent: f64,
        fee_fraction: f64,
        currency: &str,
    ) -> EarningsProjection {
        if !principal.is_finite() || principal <= 0.0 {
            return EarningsProjection::ZERO;
        }
        if !apy_percent.is_finite() || apy_percent < 0.0 {
            return EarningsProjection::ZERO;
        }
        if !fee_fraction.is_finite() || !(0.0..=1.0).contains(&fee_fraction) {
            return EarningsProjection::ZERO;
        }

        let price = self.rates.token_price(currency);
        let token_amount = principal / price;

        let yearly_tokens = token_amount * (apy_percent / 100.0) * (1.0 - fee_fraction);
        let yearly = yearly_tokens * price;

        EarningsProjection {
            token_amount,
            daily: yearly / DAYS_PER_YEAR,
            monthly: yearly / MONTHS_PER_YEAR,
            yearly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-6;

    #[test]
    fn test_worked_example_ngn() {
        // 50,000 NGN at 65.6% APY, zero fee
        let est = EarningsEstimator::new(RateProvider::new());
        let p = est.project(50_000.0, 65.6, 0.0, "NGN");

        assert!((p.token_amount - 4.5381).abs() < 0.01);
        assert!((p.yearly - 32_800.0).abs() < 1.0);
        assert!((p.daily - 89.86).abs() < 0.1);
        assert!((p.monthly - 2_733.33).abs() < 1.0);
    }

    #[test]
    fn test_fee_reduces_yield() {
        let est = EarningsEstimator::new(RateProvider::new());
        let gross = est.project(1_000.0, 10.0, 0.0, "USD");
        let net = est.project(1_000.0, 10.0, 0.25, "USD");
        assert!((net.yearly - gross.yearly * 0.75).abs() < EPS);
    }

    #[test]
    fn test_invalid_principal_is_zero() {
        let est = EarningsEstimator::new(RateProvider::new());
        assert_eq!(est.project(0.0, 50.0, 0.0, "USD"), EarningsProjection::ZERO);
        assert_eq!(
            est.project(-10.0, 50.0, 0.0, "USD"),
            EarningsProjection::ZERO
        );
        assert_eq!(
            est.project(f64::NAN, 50.0, 0.0, "USD"),
            EarningsProjection::ZERO
        );
    }

    #[test]
    fn test_out_of_range_fee_is_zero() {
        let est = EarningsEstimator::new(RateProvider::new());
        assert_eq!(
            est.project(1_000.0, 50.0, 1.5, "USD"),
            EarningsProjection::ZERO
        );
        assert_eq!(
            est.project(1_000.0, 50.0, -0.1, "USD"),
            EarningsProjection::ZERO
        );
    }

    proptest! {
        #[test]
        fn prop_projection_identity(
            principal in 0.01f64..10_000_000.0,
            apy in 0.0f64..200.0,
            fee in 0.0f64..1.0,
        ) {
            let est = EarningsEstimator::new(RateProvider::new());
            let p = est.project(principal, apy, fee, "NGN");

            // price cancels: yearly equals principal x apy/100 x (1 - fee)
            let expected_yearly = principal * (apy / 100.0) * (1.0 - fee);
            prop_assert!((p.yearly - expected_yearly).abs() < expected_yearly.abs() * 1e-9 + 1e-9);
            prop_assert!((p.daily - p.yearly / 365.0).abs() < 1e-9 * p.yearly.abs().max(1.0));
            prop_assert!((p.monthly - p.yearly / 12.0).abs() < 1e-9 * p.yearly.abs().max(1.0));
        }

        #[test]
        fn prop_non_positive_principal_zero(principal in -1_000_000.0f64..=0.0) {
            let est = EarningsEstimator::new(RateProvider::new());
            prop_assert_eq!(est.project(principal, 65.6, 0.1, "USD"), EarningsProjection::ZERO);
        }
    }
}
