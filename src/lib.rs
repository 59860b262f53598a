// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Pre-trade risk validation for multi-leg options strategies.
//!
//! Given a proposed set of option legs on a single underlying, an existing
//! portfolio, and a market context, the engine classifies the strategy shape,
//! aggregates Black-Scholes Greeks across the combined portfolio, models the
//! probability of profit under a lognormal terminal price, sizes the capital
//! or margin requirement, and runs a battery of orthogonal risk checks. The
//! outcome is a single [`ValidationResult`]: one pass/fail verdict plus every
//! itemized finding, so a caller decides once instead of interrogating eight
//! subsystems.
//!
//! The engine is a pure function of its inputs - no I/O, no clock reads, no
//! caching. Hosts that want the engine wired to live data implement the
//! [`MarketDataProvider`] and [`PortfolioStore`] traits and go through
//! [`ValidationService`].
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//! use risk_engine::{
//!     MarketContext, OptionAction, OptionPosition, OptionType,
//!     PortfolioContext, RiskEngine, RiskProfile,
//! };
//!
//! let leg = OptionPosition {
//!     symbol: "AAPL".to_string(),
//!     option_type: OptionType::Call,
//!     action: OptionAction::Buy,
//!     strike: Decimal::from(250),
//!     expiry: NaiveDate::from_ymd_opt(2026, 9, 20).unwrap(),
//!     quantity: 1,
//!     premium: Decimal::from(5),
//!     implied_volatility: 0.45,
//!     underlying_price: Decimal::from(245),
//! };
//! let portfolio = PortfolioContext::new(Decimal::from(25_000), RiskProfile::Moderate);
//! let market = MarketContext::new(NaiveDate::from_ymd_opt(2026, 8, 21).unwrap());
//!
//! let result = RiskEngine::default().validate(&[leg], &portfolio, &market)?;
//! assert!(result.passed);
//! # Ok::<(), risk_engine::ValidationError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Capital, margin, and the capital-requirement check.
pub mod capital;

/// Orthogonal risk checks and the shared check result type.
pub mod checks;

/// Strategy shape classification and payoff bounds.
pub mod classifier;

/// Caller-supplied portfolio and market context.
pub mod context;

/// The validation aggregator and its configuration.
pub mod engine;

/// Error taxonomy.
pub mod error;

/// Black-Scholes Greeks and portfolio aggregation.
pub mod greeks;

/// Option leg types and per-leg input validation.
pub mod position;

/// Lognormal probability-of-profit modeling.
pub mod probability;

/// Risk profiles and concentration limits.
pub mod profile;

/// Collaborator traits and the host-facing service seam.
pub mod providers;

/// The aggregated validation verdict.
pub mod result;

pub use capital::CapitalAssessment;
pub use checks::{CheckLevel, RiskCheck};
pub use classifier::{ClassifiedStrategy, PayoffBound, StrategyInfo, StrategyType};
pub use context::{MarketContext, PortfolioContext};
pub use engine::{EngineConfig, RiskEngine};
pub use error::ValidationError;
pub use greeks::{GreeksImpact, GreeksSnapshot};
pub use position::{OptionAction, OptionPosition, OptionType};
pub use probability::ProbabilityAnalysis;
pub use profile::{ConcentrationLimits, GreeksLimits, RiskProfile};
pub use providers::{
    MarketDataProvider, PortfolioStore, ProviderError, ServiceError, ValidationService,
};
pub use result::ValidationResult;
