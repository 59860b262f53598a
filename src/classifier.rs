//! Strategy classification.
//!
//! Infers a strategy type from the *shape* of the proposed leg set (leg
//! count, option types, strikes, expiries, actions, quantities). The
//! classifier never fails: shapes that match no known strategy degrade to
//! [`StrategyType::Custom`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capital;
use crate::position::{OptionAction, OptionPosition, OptionType};

/// The recognized strategy shapes (1-4 legs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyType {
    /// Buy a call.
    LongCall,
    /// Buy a put.
    LongPut,
    /// Sell a call (naked).
    ShortCall,
    /// Sell a put (naked or cash-secured).
    ShortPut,
    /// Vertical call spread (same expiry, different strikes).
    CallSpread,
    /// Vertical put spread (same expiry, different strikes).
    PutSpread,
    /// Call + put at the same strike and expiry, same direction.
    Straddle,
    /// Call + put at different strikes, same expiry and direction.
    Strangle,
    /// Put spread below spot + call spread above, four strikes.
    IronCondor,
    /// Iron condor whose inner (short) strikes coincide.
    IronButterfly,
    /// Same type and strike, different expiries.
    Calendar,
    /// Same type, different strikes and expiries.
    Diagonal,
    /// Three strikes, 1/2/1 quantity ratio, wings against the body.
    Butterfly,
    /// Vertical with unequal leg quantities.
    RatioSpread,
    /// Anything that matches no known shape.
    Custom,
}

impl StrategyType {
    /// Whether maximum loss is structurally capped by long wings.
    #[must_use]
    pub const fn is_defined_risk(&self) -> bool {
        matches!(
            self,
            Self::CallSpread
                | Self::PutSpread
                | Self::Butterfly
                | Self::IronCondor
                | Self::IronButterfly
        )
    }

    /// Whether the strategy profits from the underlying staying inside a
    /// price range (given the usual debit/credit direction is confirmed by
    /// the caller).
    #[must_use]
    pub const fn is_range_bound(&self) -> bool {
        matches!(
            self,
            Self::IronCondor | Self::IronButterfly | Self::Butterfly
        )
    }
}

impl fmt::Display for StrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LongCall => "Long Call",
            Self::LongPut => "Long Put",
            Self::ShortCall => "Short Call",
            Self::ShortPut => "Short Put",
            Self::CallSpread => "Call Spread",
            Self::PutSpread => "Put Spread",
            Self::Straddle => "Straddle",
            Self::Strangle => "Strangle",
            Self::IronCondor => "Iron Condor",
            Self::IronButterfly => "Iron Butterfly",
            Self::Calendar => "Calendar",
            Self::Diagonal => "Diagonal",
            Self::Butterfly => "Butterfly",
            Self::RatioSpread => "Ratio Spread",
            Self::Custom => "Custom",
        };
        write!(f, "{name}")
    }
}

/// Maximum loss/profit of a strategy: a dollar amount or unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoffBound {
    /// Capped at the contained dollar amount.
    Limited(Decimal),
    /// No structural cap.
    Unbounded,
}

impl PayoffBound {
    /// The capped amount, if any.
    #[must_use]
    pub const fn amount(&self) -> Option<Decimal> {
        match self {
            Self::Limited(amount) => Some(*amount),
            Self::Unbounded => None,
        }
    }
}

impl fmt::Display for PayoffBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limited(amount) => write!(f, "{amount}"),
            Self::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Summary of the classified proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyInfo {
    /// Classified shape.
    pub strategy_type: StrategyType,
    /// Number of proposed legs.
    pub leg_count: usize,
    /// Net premium in dollars: positive for a debit, negative for a credit.
    pub estimated_cost: Decimal,
    /// Worst-case loss.
    pub max_loss: PayoffBound,
    /// Best-case profit.
    pub max_profit: PayoffBound,
}

/// Classifier output consumed by the Greeks, probability and capital stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedStrategy {
    /// Classified shape.
    pub strategy_type: StrategyType,
    /// Strikes in ascending order.
    pub strikes: Vec<Decimal>,
    /// Net premium in dollars: positive for a debit, negative for a credit.
    pub net_premium: Decimal,
    /// Strategy summary for the final result.
    pub info: StrategyInfo,
}

impl ClassifiedStrategy {
    /// Whether the proposal collects premium (net credit).
    #[must_use]
    pub fn is_credit(&self) -> bool {
        self.net_premium < Decimal::ZERO
    }
}

/// Classify a proposed leg set.
///
/// `multiplier` is the contract multiplier used to turn per-share premiums
/// into dollar cost (typically 100 for equity options).
#[must_use]
pub fn classify(legs: &[OptionPosition], multiplier: u32) -> ClassifiedStrategy {
    let strategy_type = match legs.len() {
        1 => classify_single(&legs[0]),
        2 => classify_two_legs(&legs[0], &legs[1]),
        3 => classify_three_legs(legs),
        4 => classify_four_legs(legs),
        _ => StrategyType::Custom,
    };

    let mut strikes: Vec<Decimal> = legs.iter().map(|leg| leg.strike).collect();
    strikes.sort_unstable();

    let net_premium = capital::net_premium(legs, multiplier);
    let (max_loss, max_profit) = payoff_bounds(strategy_type, legs, &strikes, net_premium, multiplier);

    ClassifiedStrategy {
        strategy_type,
        strikes,
        net_premium,
        info: StrategyInfo {
            strategy_type,
            leg_count: legs.len(),
            estimated_cost: net_premium,
            max_loss,
            max_profit,
        },
    }
}

fn classify_single(leg: &OptionPosition) -> StrategyType {
    match (leg.action, leg.option_type) {
        (OptionAction::Buy, OptionType::Call) => StrategyType::LongCall,
        (OptionAction::Buy, OptionType::Put) => StrategyType::LongPut,
        (OptionAction::Sell, OptionType::Call) => StrategyType::ShortCall,
        (OptionAction::Sell, OptionType::Put) => StrategyType::ShortPut,
    }
}

fn classify_two_legs(a: &OptionPosition, b: &OptionPosition) -> StrategyType {
    let same_type = a.option_type == b.option_type;
    let same_strike = a.strike == b.strike;
    let same_expiry = a.expiry == b.expiry;
    let same_action = a.action == b.action;

    if same_type && same_expiry && !same_strike && !same_action {
        // One long, one short of the same type: a vertical.
        if a.quantity == b.quantity {
            return match a.option_type {
                OptionType::Call => StrategyType::CallSpread,
                OptionType::Put => StrategyType::PutSpread,
            };
        }
        return StrategyType::RatioSpread;
    }
    if !same_type && same_expiry && same_action {
        return if same_strike {
            StrategyType::Straddle
        } else {
            StrategyType::Strangle
        };
    }
    if same_type && !same_expiry {
        return if same_strike {
            StrategyType::Calendar
        } else {
            StrategyType::Diagonal
        };
    }

    StrategyType::Custom
}

fn classify_three_legs(legs: &[OptionPosition]) -> StrategyType {
    let first = &legs[0];
    let uniform = legs
        .iter()
        .all(|leg| leg.option_type == first.option_type && leg.expiry == first.expiry);
    if !uniform {
        return StrategyType::Custom;
    }

    let mut sorted: Vec<&OptionPosition> = legs.iter().collect();
    sorted.sort_by(|x, y| x.strike.cmp(&y.strike));
    let (lo, body, hi) = (sorted[0], sorted[1], sorted[2]);

    let distinct = lo.strike < body.strike && body.strike < hi.strike;
    let ratio_1_2_1 = lo.quantity == hi.quantity && body.quantity == lo.quantity * 2;
    let wings_against_body =
        lo.action == hi.action && body.action != lo.action;

    if distinct && ratio_1_2_1 && wings_against_body {
        StrategyType::Butterfly
    } else {
        StrategyType::Custom
    }
}

fn classify_four_legs(legs: &[OptionPosition]) -> StrategyType {
    let first = &legs[0];
    if !legs.iter().all(|leg| leg.expiry == first.expiry) {
        return StrategyType::Custom;
    }
    if !legs.iter().all(|leg| leg.quantity == first.quantity) {
        return StrategyType::Custom;
    }

    // Sort by strike, puts before calls at an equal strike, so a condor
    // reads [long put, short put, short call, long call].
    let mut sorted: Vec<&OptionPosition> = legs.iter().collect();
    sorted.sort_by(|x, y| {
        x.strike
            .cmp(&y.strike)
            .then_with(|| type_rank(x.option_type).cmp(&type_rank(y.option_type)))
    });

    let types_ok = sorted[0].option_type == OptionType::Put
        && sorted[1].option_type == OptionType::Put
        && sorted[2].option_type == OptionType::Call
        && sorted[3].option_type == OptionType::Call;
    let actions_ok = sorted[0].action == OptionAction::Buy
        && sorted[1].action == OptionAction::Sell
        && sorted[2].action == OptionAction::Sell
        && sorted[3].action == OptionAction::Buy;
    let wings_ok = sorted[0].strike < sorted[1].strike && sorted[2].strike < sorted[3].strike;

    if !(types_ok && actions_ok && wings_ok) {
        return StrategyType::Custom;
    }

    if sorted[1].strike == sorted[2].strike {
        StrategyType::IronButterfly
    } else {
        StrategyType::IronCondor
    }
}

const fn type_rank(option_type: OptionType) -> u8 {
    match option_type {
        OptionType::Put => 0,
        OptionType::Call => 1,
    }
}

/// Worst-case loss and best-case profit for a classified shape.
///
/// `net` is the signed net premium in dollars (debit positive). Shapes
/// without a closed form (calendar, diagonal, ratio, custom) degrade
/// conservatively: a debit caps the loss at the debit, a credit leaves the
/// loss unbounded.
fn payoff_bounds(
    strategy_type: StrategyType,
    legs: &[OptionPosition],
    strikes: &[Decimal],
    net: Decimal,
    multiplier: u32,
) -> (PayoffBound, PayoffBound) {
    let base_qty = legs.iter().map(|leg| leg.quantity).min().unwrap_or(1);
    let unit = Decimal::from(multiplier) * Decimal::from(base_qty);

    match strategy_type {
        StrategyType::LongCall => (PayoffBound::Limited(net), PayoffBound::Unbounded),
        StrategyType::LongPut => (
            PayoffBound::Limited(net),
            PayoffBound::Limited(strikes[0] * unit - net),
        ),
        StrategyType::ShortCall => (PayoffBound::Unbounded, PayoffBound::Limited(-net)),
        StrategyType::ShortPut => (
            PayoffBound::Limited(strikes[0] * unit + net),
            PayoffBound::Limited(-net),
        ),
        StrategyType::CallSpread | StrategyType::PutSpread => {
            let width = strikes[1] - strikes[0];
            if net >= Decimal::ZERO {
                (
                    PayoffBound::Limited(net),
                    PayoffBound::Limited(width * unit - net),
                )
            } else {
                (
                    PayoffBound::Limited(width * unit + net),
                    PayoffBound::Limited(-net),
                )
            }
        }
        StrategyType::Straddle | StrategyType::Strangle => {
            if net >= Decimal::ZERO {
                (PayoffBound::Limited(net), PayoffBound::Unbounded)
            } else {
                (PayoffBound::Unbounded, PayoffBound::Limited(-net))
            }
        }
        StrategyType::Butterfly => {
            let width = (strikes[1] - strikes[0]).min(strikes[2] - strikes[1]);
            if net >= Decimal::ZERO {
                (
                    PayoffBound::Limited(net),
                    PayoffBound::Limited(width * unit - net),
                )
            } else {
                (
                    PayoffBound::Limited(width * unit + net),
                    PayoffBound::Limited(-net),
                )
            }
        }
        StrategyType::IronCondor | StrategyType::IronButterfly => {
            let put_width = strikes[1] - strikes[0];
            let call_width = strikes[3] - strikes[2];
            let width = put_width.max(call_width);
            (
                PayoffBound::Limited(width * unit + net),
                PayoffBound::Limited(-net),
            )
        }
        StrategyType::Calendar
        | StrategyType::Diagonal
        | StrategyType::RatioSpread
        | StrategyType::Custom => {
            if net >= Decimal::ZERO {
                (PayoffBound::Limited(net), PayoffBound::Unbounded)
            } else {
                (PayoffBound::Unbounded, PayoffBound::Limited(-net))
            }
        }
    }
}
