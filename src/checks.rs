//! Orthogonal risk checks and their shared result type.
//!
//! Each check inspects one concern and returns a single [`RiskCheck`]; it
//! never short-circuits the others. Severity is carried in [`CheckLevel`]:
//! only a `Blocker` fails the overall validation, a `Warning` is surfaced but
//! does not block, `Info` marks a check that could not run for lack of data.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::classifier::ClassifiedStrategy;
use crate::error::ValidationError;
use crate::greeks::{self, GreeksImpact};
use crate::position::OptionPosition;
use crate::probability::ProbabilityAnalysis;
use crate::profile::{ConcentrationLimits, GreeksLimits};

/// Severity of a single risk check outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckLevel {
    /// Fails the validation.
    Blocker,
    /// Surfaced but does not block.
    Warning,
    /// Check could not be evaluated (missing optional data).
    Info,
    /// Check ran and found nothing.
    Pass,
}

impl fmt::Display for CheckLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blocker => write!(f, "BLOCKER"),
            Self::Warning => write!(f, "WARNING"),
            Self::Info => write!(f, "INFO"),
            Self::Pass => write!(f, "PASS"),
        }
    }
}

/// Outcome of one risk check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskCheck {
    /// Stable machine-readable check identifier.
    pub check_name: String,
    /// Severity of the finding.
    pub level: CheckLevel,
    /// Human-readable explanation.
    pub message: String,
    /// Observed value, when the check is numeric.
    pub current_value: Option<f64>,
    /// Threshold the observed value was compared against.
    pub limit_value: Option<f64>,
    /// Free-form detail (offending symbols, dates, strikes).
    pub details: Option<String>,
}

impl RiskCheck {
    fn new(check_name: &str, level: CheckLevel, message: impl Into<String>) -> Self {
        Self {
            check_name: check_name.to_string(),
            level,
            message: message.into(),
            current_value: None,
            limit_value: None,
            details: None,
        }
    }

    /// A passing check.
    #[must_use]
    pub fn pass(check_name: &str, message: impl Into<String>) -> Self {
        Self::new(check_name, CheckLevel::Pass, message)
    }

    /// A non-blocking finding.
    #[must_use]
    pub fn warning(check_name: &str, message: impl Into<String>) -> Self {
        Self::new(check_name, CheckLevel::Warning, message)
    }

    /// A blocking finding.
    #[must_use]
    pub fn blocker(check_name: &str, message: impl Into<String>) -> Self {
        Self::new(check_name, CheckLevel::Blocker, message)
    }

    /// A check skipped for lack of data.
    #[must_use]
    pub fn info(check_name: &str, message: impl Into<String>) -> Self {
        Self::new(check_name, CheckLevel::Info, message)
    }

    /// Attach the observed value and the limit it was compared to.
    #[must_use]
    pub fn with_values(mut self, current: f64, limit: f64) -> Self {
        self.current_value = Some(current);
        self.limit_value = Some(limit);
        self
    }

    /// Attach free-form detail.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Whether this check fails the validation.
    #[must_use]
    pub fn is_blocker(&self) -> bool {
        self.level == CheckLevel::Blocker
    }

    /// Whether this check is a non-blocking finding.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        self.level == CheckLevel::Warning
    }
}

/// Combined portfolio Greeks against the profile's ceilings.
///
/// Limits apply to the absolute value of each combined Greek; any breach is a
/// blocker and every breached Greek is named in the details.
#[must_use]
pub fn greeks_limits(impact: &GreeksImpact, limits: &GreeksLimits) -> RiskCheck {
    let combined = &impact.combined;
    let breaches: Vec<(&str, f64, f64)> = [
        ("delta", combined.delta, limits.max_delta),
        ("gamma", combined.gamma, limits.max_gamma),
        ("theta", combined.theta, limits.max_theta),
        ("vega", combined.vega, limits.max_vega),
    ]
    .into_iter()
    .filter(|(_, value, limit)| value.abs() > *limit)
    .collect();

    if breaches.is_empty() {
        return RiskCheck::pass("greeks_limits", "combined portfolio Greeks within limits");
    }

    let (worst_name, worst_value, worst_limit) = breaches
        .iter()
        .max_by(|a, b| (a.1.abs() / a.2).total_cmp(&(b.1.abs() / b.2)))
        .copied()
        .unwrap_or(breaches[0]);
    let detail = breaches
        .iter()
        .map(|(name, value, limit)| format!("{name}: |{value:.2}| > {limit:.2}"))
        .collect::<Vec<_>>()
        .join(", ");
    RiskCheck::blocker(
        "greeks_limits",
        format!("combined {worst_name} exceeds the profile limit"),
    )
    .with_values(worst_value, worst_limit)
    .with_details(detail)
}

/// Probability of profit against the profile minimum. A shortfall warns but
/// never blocks.
#[must_use]
pub fn probability_of_profit(analysis: &ProbabilityAnalysis, min_pop: f64) -> RiskCheck {
    let pop = analysis.pop_at_expiration;
    if pop >= min_pop {
        RiskCheck::pass(
            "probability_of_profit",
            format!("probability of profit {:.1}% meets the minimum", pop * 100.0),
        )
        .with_values(pop, min_pop)
    } else {
        RiskCheck::warning(
            "probability_of_profit",
            format!(
                "probability of profit {:.1}% is below the {:.0}% minimum",
                pop * 100.0,
                min_pop * 100.0
            ),
        )
        .with_values(pop, min_pop)
    }
}

/// IV-rank suitability for premium-selling strategies.
///
/// Selling premium when the IV-rank percentile is low means collecting thin
/// credit; the check warns below the threshold. Debit strategies pass, and a
/// missing percentile downgrades the check to `Info`.
#[must_use]
pub fn iv_rank(
    strategy: &ClassifiedStrategy,
    iv_rank_percentile: Option<f64>,
    threshold: f64,
) -> RiskCheck {
    if !strategy.is_credit() {
        return RiskCheck::pass("iv_rank", "not a premium-selling strategy");
    }
    let Some(percentile) = iv_rank_percentile else {
        return RiskCheck::info("iv_rank", "no IV-rank data supplied");
    };
    if percentile >= threshold {
        RiskCheck::pass(
            "iv_rank",
            format!("IV rank {percentile:.0} supports premium selling"),
        )
        .with_values(percentile, threshold)
    } else {
        RiskCheck::warning(
            "iv_rank",
            format!("selling premium at IV rank {percentile:.0} (below {threshold:.0})"),
        )
        .with_values(percentile, threshold)
    }
}

/// Legs on the proposed underlying across the existing book and the proposal.
#[must_use]
pub fn symbol_concentration(
    existing: &[OptionPosition],
    proposed: &[OptionPosition],
    limits: &ConcentrationLimits,
) -> RiskCheck {
    let Some(symbol) = proposed.first().map(|leg| leg.symbol.as_str()) else {
        return RiskCheck::pass("symbol_concentration", "no proposed legs");
    };
    let count = existing
        .iter()
        .chain(proposed)
        .filter(|leg| leg.symbol == symbol)
        .count();
    if count <= limits.max_per_symbol {
        RiskCheck::pass(
            "symbol_concentration",
            format!("{count} legs on {symbol} within the limit"),
        )
        .with_values(count as f64, limits.max_per_symbol as f64)
    } else {
        RiskCheck::warning(
            "symbol_concentration",
            format!("{count} legs concentrated on {symbol}"),
        )
        .with_values(count as f64, limits.max_per_symbol as f64)
        .with_details(symbol.to_string())
    }
}

/// Legs sharing a single expiration date across the book and the proposal.
#[must_use]
pub fn expiration_concentration(
    existing: &[OptionPosition],
    proposed: &[OptionPosition],
    limits: &ConcentrationLimits,
) -> RiskCheck {
    let mut per_expiry: HashMap<NaiveDate, usize> = HashMap::new();
    for leg in existing.iter().chain(proposed) {
        *per_expiry.entry(leg.expiry).or_insert(0) += 1;
    }
    let worst = proposed
        .iter()
        .map(|leg| leg.expiry)
        .filter_map(|expiry| per_expiry.get(&expiry).map(|count| (expiry, *count)))
        .max_by_key(|(_, count)| *count);
    match worst {
        Some((expiry, count)) if count > limits.max_per_expiry => RiskCheck::warning(
            "expiration_concentration",
            format!("{count} legs expire on {expiry}"),
        )
        .with_values(count as f64, limits.max_per_expiry as f64)
        .with_details(expiry.to_string()),
        Some((_, count)) => RiskCheck::pass(
            "expiration_concentration",
            "expiration exposure within the limit",
        )
        .with_values(count as f64, limits.max_per_expiry as f64),
        None => RiskCheck::pass("expiration_concentration", "no proposed legs"),
    }
}

/// Legs sharing one exact strike on the proposed underlying.
#[must_use]
pub fn strike_concentration(
    existing: &[OptionPosition],
    proposed: &[OptionPosition],
    limits: &ConcentrationLimits,
) -> RiskCheck {
    let Some(symbol) = proposed.first().map(|leg| leg.symbol.as_str()) else {
        return RiskCheck::pass("strike_concentration", "no proposed legs");
    };
    let mut per_strike: HashMap<Decimal, usize> = HashMap::new();
    for leg in existing.iter().chain(proposed) {
        if leg.symbol == symbol {
            *per_strike.entry(leg.strike).or_insert(0) += 1;
        }
    }
    let worst = proposed
        .iter()
        .filter_map(|leg| per_strike.get(&leg.strike).map(|count| (leg.strike, *count)))
        .max_by_key(|(_, count)| *count);
    match worst {
        Some((strike, count)) if count > limits.max_per_strike => RiskCheck::warning(
            "strike_concentration",
            format!("{count} legs stacked at strike {strike}"),
        )
        .with_values(count as f64, limits.max_per_strike as f64)
        .with_details(strike.to_string()),
        Some((_, count)) => {
            RiskCheck::pass("strike_concentration", "strike exposure within the limit")
                .with_values(count as f64, limits.max_per_strike as f64)
        }
        None => RiskCheck::pass("strike_concentration", "no proposed legs"),
    }
}

/// Early assignment exposure on short in-the-money legs near expiry.
///
/// A short leg that is ITM inside the assignment window with a delta-implied
/// assignment probability above the threshold draws a warning.
///
/// # Errors
///
/// Propagates [`ValidationError::Computation`] from the per-leg Greeks when a
/// short leg's inputs are unusable.
pub fn assignment_risk(
    proposed: &[OptionPosition],
    as_of: NaiveDate,
    risk_free_rate: f64,
    window_days: i64,
    delta_threshold: f64,
) -> Result<RiskCheck, ValidationError> {
    let mut exposed: Vec<String> = Vec::new();
    let mut worst_probability = 0.0f64;
    for leg in proposed.iter().filter(|leg| leg.is_short()) {
        let dte = leg.days_to_expiry(as_of);
        if !leg.is_in_the_money() || dte > window_days {
            continue;
        }
        // |delta| of the short option approximates the probability the leg
        // finishes ITM, which drives assignment.
        let assignment_probability = greeks::leg_greeks(leg, as_of, risk_free_rate)?.delta.abs();
        if assignment_probability > delta_threshold {
            worst_probability = worst_probability.max(assignment_probability);
            exposed.push(format!(
                "{} {} {} @ {} ({dte}d)",
                leg.symbol, leg.option_type, leg.strike, leg.expiry
            ));
        }
    }

    if exposed.is_empty() {
        Ok(RiskCheck::pass(
            "assignment_risk",
            "no short legs at material assignment risk",
        ))
    } else {
        Ok(RiskCheck::warning(
            "assignment_risk",
            format!("{} short leg(s) at early assignment risk", exposed.len()),
        )
        .with_values(worst_probability, delta_threshold)
        .with_details(exposed.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use crate::greeks::GreeksSnapshot;
    use crate::position::{OptionAction, OptionType};
    use rust_decimal_macros::dec;

    fn impact(delta: f64, gamma: f64, theta: f64, vega: f64) -> GreeksImpact {
        let combined = GreeksSnapshot {
            delta,
            gamma,
            theta,
            vega,
            rho: 0.0,
        };
        GreeksImpact {
            current: GreeksSnapshot::ZERO,
            new_trade: combined,
            combined,
        }
    }

    fn limits() -> GreeksLimits {
        GreeksLimits {
            max_delta: 100.0,
            max_gamma: 10.0,
            max_theta: 250.0,
            max_vega: 500.0,
        }
    }

    fn leg(
        symbol: &str,
        option_type: OptionType,
        action: OptionAction,
        strike: Decimal,
        expiry: NaiveDate,
    ) -> OptionPosition {
        OptionPosition {
            symbol: symbol.to_string(),
            option_type,
            action,
            strike,
            expiry,
            quantity: 1,
            premium: dec!(2),
            implied_volatility: 0.30,
            underlying_price: dec!(250),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn greeks_within_limits_pass() {
        let check = greeks_limits(&impact(40.0, 2.0, -50.0, 100.0), &limits());
        assert_eq!(check.level, CheckLevel::Pass);
    }

    #[test]
    fn greeks_breach_is_blocker_and_names_the_greek() {
        let check = greeks_limits(&impact(-150.0, 2.0, -50.0, 100.0), &limits());
        assert_eq!(check.level, CheckLevel::Blocker);
        assert!(check.message.contains("delta"));
        assert_eq!(check.current_value, Some(-150.0));
        assert_eq!(check.limit_value, Some(100.0));
    }

    #[test]
    fn greeks_breach_lists_every_offender() {
        let check = greeks_limits(&impact(150.0, 20.0, -50.0, 100.0), &limits());
        let details = check.details.unwrap();
        assert!(details.contains("delta"));
        assert!(details.contains("gamma"));
    }

    #[test]
    fn low_pop_warns_but_does_not_block() {
        let analysis = ProbabilityAnalysis {
            pop_at_expiration: 0.38,
            breakeven_prices: vec![dec!(255)],
            profit_50_probability: 0.456,
            profit_25_probability: 0.513,
        };
        let check = probability_of_profit(&analysis, 0.60);
        assert_eq!(check.level, CheckLevel::Warning);
        assert!(!check.is_blocker());
    }

    #[test]
    fn iv_rank_only_applies_to_credit_strategies() {
        let expiry = date(2026, 9, 20);
        let debit = vec![leg("AAPL", OptionType::Call, OptionAction::Buy, dec!(250), expiry)];
        let strategy = classify(&debit, 100);
        let check = iv_rank(&strategy, Some(10.0), 50.0);
        assert_eq!(check.level, CheckLevel::Pass);
    }

    #[test]
    fn low_iv_rank_warns_for_premium_selling() {
        let expiry = date(2026, 9, 20);
        let credit = vec![leg("AAPL", OptionType::Put, OptionAction::Sell, dec!(240), expiry)];
        let strategy = classify(&credit, 100);

        let check = iv_rank(&strategy, Some(30.0), 50.0);
        assert_eq!(check.level, CheckLevel::Warning);

        let check = iv_rank(&strategy, None, 50.0);
        assert_eq!(check.level, CheckLevel::Info);

        let check = iv_rank(&strategy, Some(62.0), 50.0);
        assert_eq!(check.level, CheckLevel::Pass);
    }

    #[test]
    fn symbol_concentration_counts_existing_and_proposed() {
        let expiry = date(2026, 9, 20);
        let existing = vec![
            leg("AAPL", OptionType::Call, OptionAction::Buy, dec!(240), expiry),
            leg("AAPL", OptionType::Put, OptionAction::Buy, dec!(230), expiry),
            leg("MSFT", OptionType::Call, OptionAction::Buy, dec!(400), expiry),
        ];
        let proposed = vec![
            leg("AAPL", OptionType::Call, OptionAction::Buy, dec!(250), expiry),
            leg("AAPL", OptionType::Call, OptionAction::Sell, dec!(260), expiry),
        ];
        let check = symbol_concentration(&existing, &proposed, &ConcentrationLimits::default());
        assert_eq!(check.level, CheckLevel::Warning);
        assert_eq!(check.current_value, Some(4.0));
    }

    #[test]
    fn expiration_concentration_flags_a_crowded_date() {
        let expiry = date(2026, 9, 20);
        let existing: Vec<_> = (0..5)
            .map(|i| {
                leg(
                    "AAPL",
                    OptionType::Call,
                    OptionAction::Buy,
                    dec!(200) + Decimal::from(i * 10),
                    expiry,
                )
            })
            .collect();
        let proposed = vec![leg("AAPL", OptionType::Put, OptionAction::Buy, dec!(230), expiry)];
        let check = expiration_concentration(&existing, &proposed, &ConcentrationLimits::default());
        assert_eq!(check.level, CheckLevel::Warning);
        assert_eq!(check.current_value, Some(6.0));
    }

    #[test]
    fn strike_concentration_flags_a_stacked_strike() {
        let expiry = date(2026, 9, 20);
        let other = date(2026, 10, 18);
        let existing = vec![
            leg("AAPL", OptionType::Call, OptionAction::Buy, dec!(250), expiry),
            leg("AAPL", OptionType::Put, OptionAction::Sell, dec!(250), other),
            leg("AAPL", OptionType::Call, OptionAction::Sell, dec!(250), other),
        ];
        let proposed = vec![leg("AAPL", OptionType::Put, OptionAction::Buy, dec!(250), expiry)];
        let check = strike_concentration(&existing, &proposed, &ConcentrationLimits::default());
        assert_eq!(check.level, CheckLevel::Warning);
        assert_eq!(check.current_value, Some(4.0));
    }

    #[test]
    fn deep_itm_short_near_expiry_warns_on_assignment() {
        let as_of = date(2026, 8, 21);
        let expiry = date(2026, 8, 25);
        let mut short = leg("AAPL", OptionType::Call, OptionAction::Sell, dec!(220), expiry);
        short.underlying_price = dec!(250);
        let check = assignment_risk(&[short], as_of, 0.05, 7, 0.5).unwrap();
        assert_eq!(check.level, CheckLevel::Warning);
        assert!(check.details.unwrap().contains("220"));
    }

    #[test]
    fn otm_short_does_not_warn_on_assignment() {
        let as_of = date(2026, 8, 21);
        let expiry = date(2026, 8, 25);
        let short = leg("AAPL", OptionType::Call, OptionAction::Sell, dec!(280), expiry);
        let check = assignment_risk(&[short], as_of, 0.05, 7, 0.5).unwrap();
        assert_eq!(check.level, CheckLevel::Pass);
    }

    #[test]
    fn long_itm_leg_is_ignored_by_assignment_check() {
        let as_of = date(2026, 8, 21);
        let expiry = date(2026, 8, 25);
        let mut long = leg("AAPL", OptionType::Call, OptionAction::Buy, dec!(220), expiry);
        long.underlying_price = dec!(250);
        let check = assignment_risk(&[long], as_of, 0.05, 7, 0.5).unwrap();
        assert_eq!(check.level, CheckLevel::Pass);
    }

    #[test]
    fn check_level_serde_is_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&CheckLevel::Blocker).unwrap(),
            "\"BLOCKER\""
        );
    }
}
