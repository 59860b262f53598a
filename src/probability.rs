//! Probability-of-profit modeling.
//!
//! Terminal price is modeled as lognormal with `mu = ln(spot)` and
//! `sigma = iv * sqrt(t)`, using the nearest proposed leg's days to expiry
//! and implied volatility. Directional strategies get a one-sided tail
//! probability around their single breakeven; range-bound strategies get
//! the probability mass between their two breakevens (or outside, for
//! long-volatility shapes).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::classifier::{ClassifiedStrategy, StrategyType};
use crate::error::ValidationError;
use crate::greeks::norm_cdf;
use crate::position::{OptionPosition, OptionType};

/// Probability outputs for a proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityAnalysis {
    /// Probability the strategy is profitable at expiration.
    pub pop_at_expiration: f64,
    /// Breakeven underlying price(s), ascending (one or two entries).
    pub breakeven_prices: Vec<Decimal>,
    /// Heuristic probability of reaching 50% of max profit before expiry.
    pub profit_50_probability: f64,
    /// Heuristic probability of reaching 25% of max profit before expiry.
    pub profit_25_probability: f64,
}

/// Where the strategy makes money relative to its breakeven(s).
enum ProfitRegion {
    /// Profits when the terminal price finishes above the level.
    Above(Decimal),
    /// Profits when the terminal price finishes below the level.
    Below(Decimal),
    /// Profits between the two levels.
    Inside(Decimal, Decimal),
    /// Profits outside the two levels.
    Outside(Decimal, Decimal),
    /// No closed-form breakeven; neutral prior.
    Neutral,
}

/// Analyze a classified proposal.
///
/// # Errors
///
/// Returns [`ValidationError::Computation`] when the nearest leg's time to
/// expiry is non-positive or a price is not representable as `f64`.
pub fn analyze(
    strategy: &ClassifiedStrategy,
    legs: &[OptionPosition],
    as_of: NaiveDate,
) -> Result<ProbabilityAnalysis, ValidationError> {
    // Nearest expiry drives the distribution.
    let nearest = legs
        .iter()
        .min_by_key(|leg| leg.days_to_expiry(as_of))
        .ok_or(ValidationError::EmptyProposal)?;
    let computation = |reason: String| ValidationError::Computation {
        symbol: nearest.symbol.clone(),
        strike: nearest.strike,
        expiry: nearest.expiry,
        reason,
    };

    let t = nearest.days_to_expiry(as_of) as f64 / 365.0;
    if t <= 0.0 {
        return Err(computation("time to expiry is not positive".to_string()));
    }
    let sigma = nearest.implied_volatility * t.sqrt();
    if sigma <= 0.0 || !sigma.is_finite() {
        return Err(computation("volatility term is not positive".to_string()));
    }
    let spot = legs[0]
        .underlying_price
        .to_f64()
        .filter(|v| *v > 0.0)
        .ok_or_else(|| computation("underlying price is not representable".to_string()))?;

    let region = profit_region(strategy, legs);
    let pop = region_probability(&region, spot, sigma, &computation)?;

    let breakeven_prices = match &region {
        ProfitRegion::Above(level) | ProfitRegion::Below(level) => vec![*level],
        ProfitRegion::Inside(lo, hi) | ProfitRegion::Outside(lo, hi) => vec![*lo, *hi],
        ProfitRegion::Neutral => vec![legs[0].underlying_price],
    };

    Ok(ProbabilityAnalysis {
        pop_at_expiration: pop,
        breakeven_prices,
        profit_50_probability: early_exit_estimate(pop, 1.20),
        profit_25_probability: early_exit_estimate(pop, 1.35),
    })
}

/// Fixed conservative early-exit heuristic: managing a winner at a partial
/// profit target is somewhat more likely than holding to full profit at
/// expiry, so scale PoP up by a constant and cap it. A placeholder policy;
/// only its monotonic relationship to PoP is contractual.
fn early_exit_estimate(pop: f64, factor: f64) -> f64 {
    (pop * factor).min(0.99)
}

fn region_probability(
    region: &ProfitRegion,
    spot: f64,
    sigma: f64,
    computation: &impl Fn(String) -> ValidationError,
) -> Result<f64, ValidationError> {
    let z = |level: Decimal| -> Result<f64, ValidationError> {
        let level = level
            .to_f64()
            .ok_or_else(|| computation("breakeven is not representable".to_string()))?;
        if level <= 0.0 {
            // A non-positive breakeven means the profit condition is
            // satisfied (or impossible) for every terminal price.
            return Ok(f64::NEG_INFINITY);
        }
        Ok((level.ln() - spot.ln()) / sigma)
    };
    let cdf = |z_val: f64| {
        if z_val == f64::NEG_INFINITY {
            0.0
        } else {
            norm_cdf(z_val)
        }
    };

    let pop = match region {
        ProfitRegion::Above(level) => 1.0 - cdf(z(*level)?),
        ProfitRegion::Below(level) => cdf(z(*level)?),
        ProfitRegion::Inside(lo, hi) => (cdf(z(*hi)?) - cdf(z(*lo)?)).max(0.0),
        ProfitRegion::Outside(lo, hi) => 1.0 - (cdf(z(*hi)?) - cdf(z(*lo)?)).max(0.0),
        ProfitRegion::Neutral => 0.5,
    };
    Ok(pop.clamp(0.0, 1.0))
}

/// Per-share net premium, normalized to the smallest leg quantity.
fn net_per_share(legs: &[OptionPosition]) -> Decimal {
    let base_qty = legs.iter().map(|leg| leg.quantity).min().unwrap_or(1).max(1);
    let total: Decimal = legs
        .iter()
        .map(|leg| {
            let signed = Decimal::from(leg.signed_quantity());
            leg.premium * signed
        })
        .sum();
    total / Decimal::from(base_qty)
}

fn profit_region(strategy: &ClassifiedStrategy, legs: &[OptionPosition]) -> ProfitRegion {
    let strikes = &strategy.strikes;
    let abs_ps = net_per_share(legs).abs();
    let credit = strategy.is_credit();

    match strategy.strategy_type {
        StrategyType::LongCall => ProfitRegion::Above(strikes[0] + abs_ps),
        StrategyType::ShortPut => ProfitRegion::Above(strikes[0] - abs_ps),
        StrategyType::LongPut => ProfitRegion::Below(strikes[0] - abs_ps),
        StrategyType::ShortCall => ProfitRegion::Below(strikes[0] + abs_ps),
        StrategyType::CallSpread => {
            let level = strikes[0] + abs_ps;
            if credit {
                ProfitRegion::Below(level)
            } else {
                ProfitRegion::Above(level)
            }
        }
        StrategyType::PutSpread => {
            let level = strikes[1] - abs_ps;
            if credit {
                ProfitRegion::Above(level)
            } else {
                ProfitRegion::Below(level)
            }
        }
        StrategyType::Straddle => {
            let strike = strikes[0];
            let (lo, hi) = (strike - abs_ps, strike + abs_ps);
            if credit {
                ProfitRegion::Inside(lo, hi)
            } else {
                ProfitRegion::Outside(lo, hi)
            }
        }
        StrategyType::Strangle => {
            // Strikes are per option type, not just sorted order.
            let put_strike = strangle_strike(legs, OptionType::Put).unwrap_or(strikes[0]);
            let call_strike = strangle_strike(legs, OptionType::Call).unwrap_or(strikes[1]);
            let (lo, hi) = (put_strike - abs_ps, call_strike + abs_ps);
            if credit {
                ProfitRegion::Inside(lo, hi)
            } else {
                ProfitRegion::Outside(lo, hi)
            }
        }
        StrategyType::IronCondor => {
            ProfitRegion::Inside(strikes[1] - abs_ps, strikes[2] + abs_ps)
        }
        StrategyType::IronButterfly => {
            ProfitRegion::Inside(strikes[1] - abs_ps, strikes[1] + abs_ps)
        }
        StrategyType::Butterfly => {
            let (lo, hi) = (strikes[0] + abs_ps, strikes[2] - abs_ps);
            if credit {
                ProfitRegion::Outside(lo, hi)
            } else {
                ProfitRegion::Inside(lo, hi)
            }
        }
        StrategyType::Calendar
        | StrategyType::Diagonal
        | StrategyType::RatioSpread
        | StrategyType::Custom => ProfitRegion::Neutral,
    }
}

fn strangle_strike(legs: &[OptionPosition], option_type: OptionType) -> Option<Decimal> {
    legs.iter()
        .find(|leg| leg.option_type == option_type)
        .map(|leg| leg.strike)
}
