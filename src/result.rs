//! Aggregated validation verdict.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::checks::RiskCheck;
use crate::classifier::StrategyInfo;
use crate::greeks::GreeksImpact;
use crate::probability::ProbabilityAnalysis;

/// Everything a caller needs to decide whether to route the order: the single
/// pass/fail verdict plus every itemized finding and the analysis behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// `false` iff at least one check is a blocker.
    pub passed: bool,
    /// Every check, in the engine's fixed order.
    pub checks: Vec<RiskCheck>,
    /// Classification and payoff bounds of the proposal.
    pub strategy_info: StrategyInfo,
    /// Portfolio Greeks before, of the trade, and after.
    pub greeks_impact: GreeksImpact,
    /// Probability-of-profit model output.
    pub probability_analysis: ProbabilityAnalysis,
    /// Signed net premium of the proposal (debit positive).
    pub estimated_cost: Decimal,
}

impl ValidationResult {
    /// The checks that fail the validation.
    #[must_use]
    pub fn blockers(&self) -> Vec<&RiskCheck> {
        self.checks.iter().filter(|check| check.is_blocker()).collect()
    }

    /// The non-blocking findings.
    #[must_use]
    pub fn warnings(&self) -> Vec<&RiskCheck> {
        self.checks.iter().filter(|check| check.is_warning()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{PayoffBound, StrategyType};
    use crate::greeks::GreeksSnapshot;
    use rust_decimal_macros::dec;

    fn result_with(checks: Vec<RiskCheck>) -> ValidationResult {
        ValidationResult {
            passed: !checks.iter().any(RiskCheck::is_blocker),
            checks,
            strategy_info: StrategyInfo {
                strategy_type: StrategyType::LongCall,
                leg_count: 1,
                estimated_cost: dec!(500),
                max_loss: PayoffBound::Limited(dec!(500)),
                max_profit: PayoffBound::Unbounded,
            },
            greeks_impact: GreeksImpact {
                current: GreeksSnapshot::ZERO,
                new_trade: GreeksSnapshot::ZERO,
                combined: GreeksSnapshot::ZERO,
            },
            probability_analysis: ProbabilityAnalysis {
                pop_at_expiration: 0.38,
                breakeven_prices: vec![dec!(255)],
                profit_50_probability: 0.456,
                profit_25_probability: 0.513,
            },
            estimated_cost: dec!(500),
        }
    }

    #[test]
    fn blockers_and_warnings_are_partitioned() {
        let result = result_with(vec![
            RiskCheck::pass("capital_requirement", "ok"),
            RiskCheck::blocker("greeks_limits", "over"),
            RiskCheck::warning("probability_of_profit", "thin"),
        ]);
        assert!(!result.passed);
        assert_eq!(result.blockers().len(), 1);
        assert_eq!(result.warnings().len(), 1);
    }

    #[test]
    fn warnings_alone_do_not_fail() {
        let result = result_with(vec![RiskCheck::warning("probability_of_profit", "thin")]);
        assert!(result.passed);
    }
}
