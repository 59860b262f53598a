//! Black-Scholes Greeks and portfolio aggregation.
//!
//! Greeks use standard mathematical notation (s, k, t, r, sigma). Theta is
//! quoted per calendar day, vega per volatility point, rho per 1% rate move,
//! matching the usual broker display conventions. No dividend yield term:
//! the engine prices the underlying as non-dividend-paying.

#![allow(clippy::many_single_char_names)]
#![allow(clippy::suboptimal_flops)]

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::position::{OptionPosition, OptionType};

/// Days-per-year convention for time to expiry.
const DAYS_PER_YEAR: f64 = 365.0;

/// First-order (and gamma) sensitivities of an option or a whole book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GreeksSnapshot {
    /// Sensitivity to a $1 underlying move.
    pub delta: f64,
    /// Rate of change of delta per $1 underlying move.
    pub gamma: f64,
    /// Time decay per calendar day.
    pub theta: f64,
    /// Sensitivity per volatility point (1% IV move).
    pub vega: f64,
    /// Sensitivity per 1% rate move.
    pub rho: f64,
}

impl GreeksSnapshot {
    /// All-zero snapshot.
    pub const ZERO: Self = Self {
        delta: 0.0,
        gamma: 0.0,
        theta: 0.0,
        vega: 0.0,
        rho: 0.0,
    };

    /// Elementwise sum.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        Self {
            delta: self.delta + other.delta,
            gamma: self.gamma + other.gamma,
            theta: self.theta + other.theta,
            vega: self.vega + other.vega,
            rho: self.rho + other.rho,
        }
    }

    /// Scale every component (signed quantity for long/short books).
    #[must_use]
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            delta: self.delta * factor,
            gamma: self.gamma * factor,
            theta: self.theta * factor,
            vega: self.vega * factor,
            rho: self.rho * factor,
        }
    }
}

/// The three snapshots produced per validation call.
///
/// Invariant: `combined` is computed as the exact elementwise sum of
/// `current` and `new_trade`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GreeksImpact {
    /// Existing book only.
    pub current: GreeksSnapshot,
    /// Proposed legs only.
    pub new_trade: GreeksSnapshot,
    /// `current + new_trade`.
    pub combined: GreeksSnapshot,
}

// Standard normal helpers, shared with the probability model.

pub(crate) fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + libm::erf(x / std::f64::consts::SQRT_2))
}

fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

fn d1(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> f64 {
    ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / (sigma * t.sqrt())
}

/// Per-contract Black-Scholes Greeks for one leg (unsigned, per share).
///
/// # Errors
///
/// Returns [`ValidationError::Computation`] identifying the leg when the
/// time to expiry or volatility is non-positive, or when the math does not
/// produce finite values.
pub fn leg_greeks(
    leg: &OptionPosition,
    as_of: NaiveDate,
    risk_free_rate: f64,
) -> Result<GreeksSnapshot, ValidationError> {
    let computation = |reason: String| ValidationError::Computation {
        symbol: leg.symbol.clone(),
        strike: leg.strike,
        expiry: leg.expiry,
        reason,
    };

    let t = leg.days_to_expiry(as_of) as f64 / DAYS_PER_YEAR;
    if t <= 0.0 {
        return Err(computation("time to expiry is not positive".to_string()));
    }
    let sigma = leg.implied_volatility;
    if sigma <= 0.0 {
        return Err(computation("implied volatility is not positive".to_string()));
    }
    let s = leg
        .underlying_price
        .to_f64()
        .filter(|v| *v > 0.0)
        .ok_or_else(|| computation("underlying price is not representable".to_string()))?;
    let k = leg
        .strike
        .to_f64()
        .filter(|v| *v > 0.0)
        .ok_or_else(|| computation("strike is not representable".to_string()))?;
    let r = risk_free_rate;

    let sqrt_t = t.sqrt();
    let d1_val = d1(s, k, t, r, sigma);
    let d2_val = d1_val - sigma * sqrt_t;
    let discount = (-r * t).exp();

    let delta = match leg.option_type {
        OptionType::Call => norm_cdf(d1_val),
        OptionType::Put => norm_cdf(d1_val) - 1.0,
    };
    let gamma = norm_pdf(d1_val) / (s * sigma * sqrt_t);
    let decay = -s * norm_pdf(d1_val) * sigma / (2.0 * sqrt_t);
    let theta = match leg.option_type {
        OptionType::Call => (decay - r * k * discount * norm_cdf(d2_val)) / DAYS_PER_YEAR,
        OptionType::Put => (decay + r * k * discount * norm_cdf(-d2_val)) / DAYS_PER_YEAR,
    };
    let vega = s * norm_pdf(d1_val) * sqrt_t / 100.0;
    let rho = match leg.option_type {
        OptionType::Call => k * t * discount * norm_cdf(d2_val) / 100.0,
        OptionType::Put => -k * t * discount * norm_cdf(-d2_val) / 100.0,
    };

    let snapshot = GreeksSnapshot {
        delta,
        gamma,
        theta,
        vega,
        rho,
    };
    let finite = [delta, gamma, theta, vega, rho]
        .iter()
        .all(|v| v.is_finite());
    if !finite {
        return Err(computation("Greeks did not evaluate to finite values".to_string()));
    }
    Ok(snapshot)
}

/// Sum of per-leg Greeks scaled by signed quantity (+buy / -sell).
pub fn aggregate(
    positions: &[OptionPosition],
    as_of: NaiveDate,
    risk_free_rate: f64,
) -> Result<GreeksSnapshot, ValidationError> {
    let mut total = GreeksSnapshot::ZERO;
    for leg in positions {
        let per_contract = leg_greeks(leg, as_of, risk_free_rate)?;
        total = total.add(&per_contract.scale(leg.signed_quantity() as f64));
    }
    Ok(total)
}

/// Build the current / new-trade / combined snapshots for a proposal.
pub fn portfolio_impact(
    existing: &[OptionPosition],
    proposed: &[OptionPosition],
    as_of: NaiveDate,
    risk_free_rate: f64,
) -> Result<GreeksImpact, ValidationError> {
    let current = aggregate(existing, as_of, risk_free_rate)?;
    let new_trade = aggregate(proposed, as_of, risk_free_rate)?;
    let combined = current.add(&new_trade);
    Ok(GreeksImpact {
        current,
        new_trade,
        combined,
    })
}
