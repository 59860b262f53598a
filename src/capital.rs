//! Net premium, margin requirement, and the capital check.
//!
//! All money math stays in [`Decimal`]. Debit strategies need their full cost
//! in cash. Credit strategies need margin: defined-risk spreads post the
//! worst-case width minus the credit received; undefined-risk short legs use
//! a Reg-T-style proxy of `max(20% of spot − OTM amount, 10% of spot)` per
//! contract, taking the largest short leg's requirement without offsetting
//! the credit.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::checks::RiskCheck;
use crate::classifier::{ClassifiedStrategy, StrategyType};
use crate::position::{OptionPosition, OptionType};

/// Capital figures for a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalAssessment {
    /// Signed net premium of the proposal (debit positive, credit negative).
    pub estimated_cost: Decimal,
    /// Cash or margin the proposal ties up.
    pub required_capital: Decimal,
}

/// Signed net premium in account currency: debit positive, credit negative.
#[must_use]
pub fn net_premium(legs: &[OptionPosition], multiplier: u32) -> Decimal {
    let multiplier = Decimal::from(multiplier);
    legs.iter()
        .map(|leg| leg.premium * Decimal::from(leg.signed_quantity()) * multiplier)
        .sum()
}

/// Compute the capital a classified proposal requires.
#[must_use]
pub fn assess(
    strategy: &ClassifiedStrategy,
    legs: &[OptionPosition],
    multiplier: u32,
) -> CapitalAssessment {
    let estimated_cost = strategy.net_premium;
    let required_capital = if estimated_cost >= Decimal::ZERO {
        // Debit: the full cost is paid up front.
        estimated_cost
    } else if strategy.strategy_type.is_defined_risk() {
        defined_risk_margin(strategy, legs, multiplier)
    } else {
        naked_margin(legs, multiplier)
    };
    CapitalAssessment {
        estimated_cost,
        required_capital: required_capital.max(Decimal::ZERO),
    }
}

/// Worst-case strike width times size, less the credit received.
fn defined_risk_margin(
    strategy: &ClassifiedStrategy,
    legs: &[OptionPosition],
    multiplier: u32,
) -> Decimal {
    let credit = -strategy.net_premium;
    let base_qty = legs.iter().map(|leg| leg.quantity).min().unwrap_or(1).max(1);
    let width = max_strike_width(strategy);
    width * Decimal::from(multiplier) * Decimal::from(base_qty) - credit
}

fn max_strike_width(strategy: &ClassifiedStrategy) -> Decimal {
    let strikes = &strategy.strikes;
    match strategy.strategy_type {
        StrategyType::CallSpread | StrategyType::PutSpread => strikes[1] - strikes[0],
        // Wing widths; the put and call sides may be unequal.
        StrategyType::IronCondor | StrategyType::IronButterfly => {
            (strikes[1] - strikes[0]).max(strikes[3] - strikes[2])
        }
        StrategyType::Butterfly => (strikes[1] - strikes[0]).max(strikes[2] - strikes[1]),
        _ => strikes
            .last()
            .zip(strikes.first())
            .map_or(Decimal::ZERO, |(hi, lo)| *hi - *lo),
    }
}

/// Reg-T-style proxy for undefined-risk short legs. Each short leg requires
/// `max(0.20·spot − OTM amount, 0.10·spot) × multiplier × quantity`; the
/// proposal requires the largest of those. The credit received is not
/// offset.
fn naked_margin(legs: &[OptionPosition], multiplier: u32) -> Decimal {
    let twenty_pct = Decimal::new(20, 2);
    let ten_pct = Decimal::new(10, 2);
    legs.iter()
        .filter(|leg| leg.is_short())
        .map(|leg| {
            let spot = leg.underlying_price;
            let otm_amount = match leg.option_type {
                OptionType::Call => (leg.strike - spot).max(Decimal::ZERO),
                OptionType::Put => (spot - leg.strike).max(Decimal::ZERO),
            };
            let per_share = (twenty_pct * spot - otm_amount).max(ten_pct * spot);
            per_share * Decimal::from(multiplier) * Decimal::from(leg.quantity)
        })
        .max()
        .unwrap_or(Decimal::ZERO)
}

/// The `capital_requirement` check: a shortfall against available cash is the
/// one finding that blocks on its own.
#[must_use]
pub fn capital_requirement(assessment: &CapitalAssessment, cash_balance: Decimal) -> RiskCheck {
    let required = assessment.required_capital;
    let required_f64 = required.to_f64().unwrap_or(f64::MAX);
    let cash_f64 = cash_balance.to_f64().unwrap_or(0.0);

    if required > cash_balance {
        return RiskCheck::blocker(
            "capital_requirement",
            format!("requires {required} but only {cash_balance} is available"),
        )
        .with_values(required_f64, cash_f64);
    }

    let pct_used = if cash_balance > Decimal::ZERO {
        (required_f64 / cash_f64) * 100.0
    } else {
        0.0
    };
    RiskCheck::pass(
        "capital_requirement",
        format!("uses {pct_used:.1}% of available capital"),
    )
    .with_values(required_f64, cash_f64)
}
