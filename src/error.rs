//! Engine error taxonomy.
//!
//! Input and computation failures abort a validation call entirely; no
//! partial result is returned. Risk violations are *not* errors - they are
//! the normal BLOCKER/WARNING outcome of a check and ride inside a complete
//! [`ValidationResult`](crate::result::ValidationResult).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Hard failures from a validation call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The proposal contained no legs.
    #[error("no proposed legs to validate")]
    EmptyProposal,

    /// A position is missing or carries an invalid required field.
    #[error("invalid leg {index} ({symbol}): {reason}")]
    InvalidPosition {
        /// Index of the offending leg in its input list.
        index: usize,
        /// Underlying symbol of the offending leg.
        symbol: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A proposed leg's expiry is not in the future.
    #[error("expired leg {index} ({symbol}): expiry {expiry} is not after {as_of}")]
    ExpiredLeg {
        /// Index of the offending leg in its input list.
        index: usize,
        /// Underlying symbol of the offending leg.
        symbol: String,
        /// The leg's expiration date.
        expiry: NaiveDate,
        /// The valuation date it was checked against.
        as_of: NaiveDate,
    },

    /// The pricing math received inputs it cannot evaluate (e.g. a
    /// non-positive time to expiry). Identifies the offending leg rather
    /// than silently producing NaN or infinity.
    #[error("computation failed for {symbol} {strike} exp {expiry}: {reason}")]
    Computation {
        /// Underlying symbol of the offending leg.
        symbol: String,
        /// Strike of the offending leg.
        strike: Decimal,
        /// Expiration date of the offending leg.
        expiry: NaiveDate,
        /// What could not be computed.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn display_identifies_the_leg() {
        let err = ValidationError::Computation {
            symbol: "TSLA".to_string(),
            strike: dec!(250),
            expiry: NaiveDate::from_ymd_opt(2026, 1, 16).unwrap(),
            reason: "time to expiry is not positive".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("TSLA"));
        assert!(msg.contains("250"));
        assert!(msg.contains("time to expiry"));
    }

    #[test]
    fn display_invalid_position() {
        let err = ValidationError::InvalidPosition {
            index: 2,
            symbol: "AAPL".to_string(),
            reason: "strike must be positive, got -5".to_string(),
        };
        assert!(err.to_string().contains("leg 2"));
    }
}
