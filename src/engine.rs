//! Validation aggregator.
//!
//! [`RiskEngine::validate`] is the crate's entry point: it fail-fast
//! validates inputs, classifies the proposal, runs the Greeks, probability,
//! and capital analyses, then executes the risk checklist in a fixed order
//! and folds everything into one [`ValidationResult`]. The engine holds only
//! configuration; every call is a pure function of its arguments.

use rust_decimal::Decimal;
use tracing::debug;

use crate::capital;
use crate::checks;
use crate::classifier;
use crate::context::{MarketContext, PortfolioContext};
use crate::error::ValidationError;
use crate::greeks;
use crate::position::OptionPosition;
use crate::probability;
use crate::profile::ConcentrationLimits;
use crate::result::ValidationResult;

/// Tunable engine parameters, supplied by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Annualized risk-free rate used in the Black-Scholes math.
    pub risk_free_rate: f64,
    /// Shares per option contract.
    pub contract_multiplier: u32,
    /// Position-count concentration thresholds.
    pub concentration: ConcentrationLimits,
    /// Days to expiry inside which short ITM legs draw assignment scrutiny.
    pub assignment_window_days: i64,
    /// Delta-implied assignment probability above which the check warns.
    pub assignment_delta_threshold: f64,
    /// IV-rank percentile below which premium selling draws a warning.
    pub low_iv_rank_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.05,
            contract_multiplier: 100,
            concentration: ConcentrationLimits::default(),
            assignment_window_days: 7,
            assignment_delta_threshold: 0.5,
            low_iv_rank_threshold: 50.0,
        }
    }
}

impl EngineConfig {
    /// Override the risk-free rate.
    #[must_use]
    pub const fn with_risk_free_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = rate;
        self
    }

    /// Override the concentration thresholds.
    #[must_use]
    pub const fn with_concentration(mut self, limits: ConcentrationLimits) -> Self {
        self.concentration = limits;
        self
    }
}

/// Pre-trade risk validation engine.
#[derive(Debug, Clone, Default)]
pub struct RiskEngine {
    config: EngineConfig,
}

impl RiskEngine {
    /// Build an engine with the given configuration.
    #[must_use]
    pub const fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The engine's configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate a proposed multi-leg strategy against a portfolio.
    ///
    /// Checks are returned in a fixed order: capital, Greeks limits,
    /// probability, IV rank, symbol concentration, expiration concentration,
    /// strike concentration, assignment risk. `passed` is `false` iff at
    /// least one check is a blocker; warnings never block.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::EmptyProposal`] for a proposal with no legs.
    /// - [`ValidationError::InvalidPosition`] / [`ValidationError::ExpiredLeg`]
    ///   when an input leg is malformed; no partial result is produced.
    /// - [`ValidationError::Computation`] when the pricing math cannot run
    ///   for a leg.
    pub fn validate(
        &self,
        proposed: &[OptionPosition],
        portfolio: &PortfolioContext,
        market: &MarketContext,
    ) -> Result<ValidationResult, ValidationError> {
        if proposed.is_empty() {
            return Err(ValidationError::EmptyProposal);
        }
        let as_of = market.valuation_date;
        for (index, leg) in proposed.iter().enumerate() {
            leg.check_fields(index, as_of, true)?;
        }
        for (index, leg) in portfolio.existing_positions.iter().enumerate() {
            leg.check_fields(index, as_of, false)?;
        }

        let strategy = classifier::classify(proposed, self.config.contract_multiplier);
        debug!(
            strategy = %strategy.strategy_type,
            legs = proposed.len(),
            "classified proposal"
        );

        // Expired legs still sitting in the book contribute nothing to the
        // forward-looking Greeks.
        let live_book: Vec<OptionPosition> = portfolio
            .existing_positions
            .iter()
            .filter(|leg| leg.days_to_expiry(as_of) > 0)
            .cloned()
            .collect();
        if live_book.len() < portfolio.existing_positions.len() {
            debug!(
                skipped = portfolio.existing_positions.len() - live_book.len(),
                "ignoring expired legs in the existing book"
            );
        }

        let greeks_impact =
            greeks::portfolio_impact(&live_book, proposed, as_of, self.config.risk_free_rate)?;
        let probability_analysis = probability::analyze(&strategy, proposed, as_of)?;
        let assessment = capital::assess(&strategy, proposed, self.config.contract_multiplier);

        let limits = portfolio.risk_profile.greeks_limits();
        let checks = vec![
            capital::capital_requirement(&assessment, portfolio.cash_balance),
            checks::greeks_limits(&greeks_impact, &limits),
            checks::probability_of_profit(
                &probability_analysis,
                portfolio.risk_profile.min_pop(),
            ),
            checks::iv_rank(
                &strategy,
                market.iv_rank_percentile,
                self.config.low_iv_rank_threshold,
            ),
            checks::symbol_concentration(
                &portfolio.existing_positions,
                proposed,
                &self.config.concentration,
            ),
            checks::expiration_concentration(
                &portfolio.existing_positions,
                proposed,
                &self.config.concentration,
            ),
            checks::strike_concentration(
                &portfolio.existing_positions,
                proposed,
                &self.config.concentration,
            ),
            checks::assignment_risk(
                proposed,
                as_of,
                self.config.risk_free_rate,
                self.config.assignment_window_days,
                self.config.assignment_delta_threshold,
            )?,
        ];

        let passed = !checks.iter().any(checks::RiskCheck::is_blocker);
        let estimated_cost: Decimal = assessment.estimated_cost;
        debug!(
            passed,
            blockers = checks.iter().filter(|check| check.is_blocker()).count(),
            warnings = checks.iter().filter(|check| check.is_warning()).count(),
            "validation complete"
        );

        Ok(ValidationResult {
            passed,
            checks,
            strategy_info: strategy.info,
            greeks_impact,
            probability_analysis,
            estimated_cost,
        })
    }
}
