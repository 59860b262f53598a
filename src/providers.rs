//! Collaborator traits and the service seam the host wires.
//!
//! The engine itself never performs I/O. Hosts implement
//! [`MarketDataProvider`] and [`PortfolioStore`] over their market data feed
//! and position store; [`ValidationService`] pulls the context through those
//! traits, refreshes the proposal's market inputs, and delegates to
//! [`RiskEngine`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::context::{MarketContext, PortfolioContext};
use crate::engine::RiskEngine;
use crate::error::ValidationError;
use crate::position::OptionPosition;
use crate::profile::RiskProfile;
use crate::result::ValidationResult;

/// Failure fetching data from a collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The underlying symbol is unknown to the market data source.
    #[error("symbol not found: {symbol}")]
    SymbolNotFound {
        /// Requested underlying symbol.
        symbol: String,
    },
    /// The portfolio is unknown to the store.
    #[error("portfolio not found: {portfolio_id}")]
    PortfolioNotFound {
        /// Requested portfolio identifier.
        portfolio_id: String,
    },
    /// The upstream source failed.
    #[error("provider unavailable: {message}")]
    Unavailable {
        /// Upstream failure description.
        message: String,
    },
}

/// Failure of a service-level validation call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    /// A collaborator could not supply its data.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// The engine rejected the inputs.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Market data the validation needs, supplied by the host.
#[cfg_attr(test, mockall::automock)]
pub trait MarketDataProvider {
    /// Current underlying price for a symbol.
    fn spot_price(&self, symbol: &str) -> Result<Decimal, ProviderError>;

    /// Current at-the-money implied volatility for a symbol (fraction).
    fn implied_volatility(&self, symbol: &str) -> Result<f64, ProviderError>;

    /// IV-rank percentile (0..100) for a symbol, when the source tracks one.
    fn iv_rank_percentile(&self, symbol: &str) -> Result<Option<f64>, ProviderError>;
}

/// Portfolio state the validation needs, supplied by the host.
#[cfg_attr(test, mockall::automock)]
pub trait PortfolioStore {
    /// Open option legs in a portfolio.
    fn open_positions(&self, portfolio_id: &str) -> Result<Vec<OptionPosition>, ProviderError>;

    /// Available cash in a portfolio.
    fn cash_balance(&self, portfolio_id: &str) -> Result<Decimal, ProviderError>;
}

/// Assembles engine inputs from the collaborator traits.
#[derive(Debug)]
pub struct ValidationService<M, P> {
    market_data: M,
    portfolio_store: P,
    engine: RiskEngine,
}

impl<M: MarketDataProvider, P: PortfolioStore> ValidationService<M, P> {
    /// Wire a service from its collaborators and an engine.
    #[must_use]
    pub const fn new(market_data: M, portfolio_store: P, engine: RiskEngine) -> Self {
        Self {
            market_data,
            portfolio_store,
            engine,
        }
    }

    /// Validate a proposal for a stored portfolio.
    ///
    /// The proposed legs' underlying price and implied volatility are
    /// refreshed from the market data provider so a stale quote on the order
    /// ticket cannot skew the analysis.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Provider`] when a collaborator fails and
    /// [`ServiceError::Validation`] when the engine rejects the inputs.
    pub fn validate_proposal(
        &self,
        portfolio_id: &str,
        proposed: &[OptionPosition],
        risk_profile: RiskProfile,
        valuation_date: NaiveDate,
    ) -> Result<ValidationResult, ServiceError> {
        let symbol = proposed
            .first()
            .map(|leg| leg.symbol.clone())
            .ok_or(ValidationError::EmptyProposal)?;

        let spot = self.market_data.spot_price(&symbol)?;
        let iv = self.market_data.implied_volatility(&symbol)?;
        let iv_rank = self.market_data.iv_rank_percentile(&symbol)?;
        let mut legs = proposed.to_vec();
        for leg in &mut legs {
            leg.underlying_price = spot;
            leg.implied_volatility = iv;
        }

        let existing = self.portfolio_store.open_positions(portfolio_id)?;
        let cash = self.portfolio_store.cash_balance(portfolio_id)?;
        debug!(
            portfolio_id,
            symbol,
            existing = existing.len(),
            "assembled validation context"
        );

        let portfolio =
            PortfolioContext::new(cash, risk_profile).with_positions(existing);
        let mut market = MarketContext::new(valuation_date);
        if let Some(percentile) = iv_rank {
            market = market.with_iv_rank(percentile);
        }

        Ok(self.engine.validate(&legs, &portfolio, &market)?)
    }
}
