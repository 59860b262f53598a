//! Caller-supplied validation context.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::position::OptionPosition;
use crate::profile::RiskProfile;

/// The portfolio a proposal is validated against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioContext {
    /// Open option legs already held.
    pub existing_positions: Vec<OptionPosition>,
    /// Available cash.
    pub cash_balance: Decimal,
    /// Risk appetite applied to this validation.
    pub risk_profile: RiskProfile,
}

impl PortfolioContext {
    /// Build a context with an empty book.
    #[must_use]
    pub const fn new(cash_balance: Decimal, risk_profile: RiskProfile) -> Self {
        Self {
            existing_positions: Vec::new(),
            cash_balance,
            risk_profile,
        }
    }

    /// Replace the existing book.
    #[must_use]
    pub fn with_positions(mut self, positions: Vec<OptionPosition>) -> Self {
        self.existing_positions = positions;
        self
    }
}

/// Externally supplied market inputs the checklist needs.
///
/// The valuation date is explicit rather than read from the clock so that a
/// call is a pure function of its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    /// Date the proposal is evaluated on; expiries must be after it.
    pub valuation_date: NaiveDate,
    /// IV-rank percentile (0..100) for the underlying, when the caller's
    /// market data source provides one. `None` skips the IV-rank check.
    pub iv_rank_percentile: Option<f64>,
}

impl MarketContext {
    /// Context with no IV-rank data.
    #[must_use]
    pub const fn new(valuation_date: NaiveDate) -> Self {
        Self {
            valuation_date,
            iv_rank_percentile: None,
        }
    }

    /// Attach an IV-rank percentile.
    #[must_use]
    pub const fn with_iv_rank(mut self, percentile: f64) -> Self {
        self.iv_rank_percentile = Some(percentile);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn portfolio_context_builders() {
        let ctx = PortfolioContext::new(dec!(25000), RiskProfile::Moderate);
        assert!(ctx.existing_positions.is_empty());
        assert_eq!(ctx.cash_balance, dec!(25000));
    }

    #[test]
    fn market_context_iv_rank() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 21).unwrap();
        let ctx = MarketContext::new(date).with_iv_rank(62.5);
        assert_eq!(ctx.iv_rank_percentile, Some(62.5));
    }
}
