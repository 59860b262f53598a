//! Option position model.
//!
//! `OptionPosition` is the single leg unit shared by every component:
//! the proposed legs, the existing book, and the Greeks/probability math
//! all operate on this shape. The engine never mutates or stores one.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Option right (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    /// Call option (right to buy).
    Call,
    /// Put option (right to sell).
    Put,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Call => write!(f, "CALL"),
            Self::Put => write!(f, "PUT"),
        }
    }
}

/// Direction of a leg: opening long (buy) or short (sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionAction {
    /// Buy to open (long).
    Buy,
    /// Sell to open (short).
    Sell,
}

impl fmt::Display for OptionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// A single option leg, proposed or already held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionPosition {
    /// Underlying symbol (e.g. "AAPL").
    pub symbol: String,
    /// Call or put.
    pub option_type: OptionType,
    /// Buy or sell.
    pub action: OptionAction,
    /// Strike price. Must be positive.
    pub strike: Decimal,
    /// Expiration date. Must be in the future for proposed legs.
    pub expiry: NaiveDate,
    /// Number of contracts. Must be positive.
    pub quantity: u32,
    /// Premium paid/received per share.
    pub premium: Decimal,
    /// Implied volatility as a fraction (0.45 = 45%). Must be positive.
    pub implied_volatility: f64,
    /// Current underlying price. Must be positive.
    pub underlying_price: Decimal,
}

impl OptionPosition {
    /// Days until expiration relative to `as_of`. Negative if already expired.
    #[must_use]
    pub fn days_to_expiry(&self, as_of: NaiveDate) -> i64 {
        self.expiry.signed_duration_since(as_of).num_days()
    }

    /// Signed contract count: positive for buys, negative for sells.
    #[must_use]
    pub fn signed_quantity(&self) -> i64 {
        match self.action {
            OptionAction::Buy => i64::from(self.quantity),
            OptionAction::Sell => -i64::from(self.quantity),
        }
    }

    /// Whether this leg is short (sold to open).
    #[must_use]
    pub const fn is_short(&self) -> bool {
        matches!(self.action, OptionAction::Sell)
    }

    /// Per-share intrinsic value against the recorded underlying price.
    #[must_use]
    pub fn intrinsic_value(&self) -> Decimal {
        match self.option_type {
            OptionType::Call => (self.underlying_price - self.strike).max(Decimal::ZERO),
            OptionType::Put => (self.strike - self.underlying_price).max(Decimal::ZERO),
        }
    }

    /// Whether the leg is in the money.
    #[must_use]
    pub fn is_in_the_money(&self) -> bool {
        self.intrinsic_value() > Decimal::ZERO
    }

    /// Fail-fast field validation.
    ///
    /// `require_future_expiry` is set for proposed legs only; the existing
    /// book is allowed to carry legs expiring today (they fail later in the
    /// Greeks math if the time to expiry is non-positive, identifying the
    /// leg).
    pub(crate) fn check_fields(
        &self,
        index: usize,
        as_of: NaiveDate,
        require_future_expiry: bool,
    ) -> Result<(), ValidationError> {
        let invalid = |reason: String| ValidationError::InvalidPosition {
            index,
            symbol: self.symbol.clone(),
            reason,
        };

        if self.symbol.trim().is_empty() {
            return Err(invalid("symbol is empty".to_string()));
        }
        if self.strike <= Decimal::ZERO {
            return Err(invalid(format!(
                "strike must be positive, got {}",
                self.strike
            )));
        }
        if self.quantity == 0 {
            return Err(invalid("quantity must be a positive integer".to_string()));
        }
        if self.premium < Decimal::ZERO {
            return Err(invalid(format!(
                "premium must not be negative, got {}",
                self.premium
            )));
        }
        if !self.implied_volatility.is_finite() || self.implied_volatility <= 0.0 {
            return Err(invalid(format!(
                "implied volatility must be positive, got {}",
                self.implied_volatility
            )));
        }
        if self.underlying_price <= Decimal::ZERO {
            return Err(invalid(format!(
                "underlying price must be positive, got {}",
                self.underlying_price
            )));
        }
        if require_future_expiry && self.expiry <= as_of {
            return Err(ValidationError::ExpiredLeg {
                index,
                symbol: self.symbol.clone(),
                expiry: self.expiry,
                as_of,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_leg() -> OptionPosition {
        OptionPosition {
            symbol: "AAPL".to_string(),
            option_type: OptionType::Call,
            action: OptionAction::Buy,
            strike: dec!(150),
            expiry: date(2026, 10, 16),
            quantity: 2,
            premium: dec!(3.50),
            implied_volatility: 0.30,
            underlying_price: dec!(148),
        }
    }

    #[test]
    fn days_to_expiry_counts_calendar_days() {
        let leg = sample_leg();
        assert_eq!(leg.days_to_expiry(date(2026, 9, 16)), 30);
        assert_eq!(leg.days_to_expiry(date(2026, 10, 16)), 0);
        assert_eq!(leg.days_to_expiry(date(2026, 10, 17)), -1);
    }

    #[test]
    fn signed_quantity_by_action() {
        let mut leg = sample_leg();
        assert_eq!(leg.signed_quantity(), 2);
        leg.action = OptionAction::Sell;
        assert_eq!(leg.signed_quantity(), -2);
        assert!(leg.is_short());
    }

    #[test]
    fn intrinsic_value_call_and_put() {
        let mut leg = sample_leg();
        leg.underlying_price = dec!(155);
        assert_eq!(leg.intrinsic_value(), dec!(5));
        assert!(leg.is_in_the_money());

        leg.option_type = OptionType::Put;
        assert_eq!(leg.intrinsic_value(), dec!(0));
        assert!(!leg.is_in_the_money());
    }

    #[test]
    fn check_fields_accepts_valid_leg() {
        let leg = sample_leg();
        assert!(leg.check_fields(0, date(2026, 9, 16), true).is_ok());
    }

    #[test]
    fn check_fields_rejects_non_positive_strike() {
        let mut leg = sample_leg();
        leg.strike = dec!(0);
        let err = leg.check_fields(0, date(2026, 9, 16), true).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidPosition { index: 0, .. }
        ));
    }

    #[test]
    fn check_fields_rejects_zero_quantity() {
        let mut leg = sample_leg();
        leg.quantity = 0;
        assert!(leg.check_fields(1, date(2026, 9, 16), true).is_err());
    }

    #[test]
    fn check_fields_rejects_non_positive_iv() {
        let mut leg = sample_leg();
        leg.implied_volatility = 0.0;
        assert!(leg.check_fields(0, date(2026, 9, 16), true).is_err());

        leg.implied_volatility = f64::NAN;
        assert!(leg.check_fields(0, date(2026, 9, 16), true).is_err());
    }

    #[test]
    fn check_fields_rejects_expired_new_leg() {
        let leg = sample_leg();
        let err = leg.check_fields(0, date(2026, 10, 16), true).unwrap_err();
        assert!(matches!(err, ValidationError::ExpiredLeg { .. }));

        // Existing legs are allowed through; the Greeks math rejects them.
        assert!(leg.check_fields(0, date(2026, 10, 16), false).is_ok());
    }

    #[test]
    fn option_position_serde() {
        let leg = sample_leg();
        let json = serde_json::to_string(&leg).unwrap();
        let parsed: OptionPosition = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, leg);
    }
}
