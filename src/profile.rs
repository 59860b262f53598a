//! Risk profiles and their numeric thresholds.
//!
//! A profile is an explicit, caller-supplied value carried in
//! [`PortfolioContext`](crate::context::PortfolioContext) - never ambient
//! global state - so two concurrent validations can run under different
//! profiles without interaction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Portfolio Greeks ceilings for a risk profile.
///
/// Limits apply to the absolute value of the *combined* (existing + proposed)
/// portfolio Greeks, expressed in per-contract units (a limit of 50 delta
/// corresponds to roughly 100 at-the-money contracts).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GreeksLimits {
    /// Maximum absolute combined delta.
    pub max_delta: f64,
    /// Maximum absolute combined gamma.
    pub max_gamma: f64,
    /// Maximum absolute combined theta (per day).
    pub max_theta: f64,
    /// Maximum absolute combined vega (per volatility point).
    pub max_vega: f64,
}

/// Risk appetite selecting the Greeks limits and minimum probability of
/// profit a proposal is held to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskProfile {
    /// Tight Greeks limits, 70% minimum PoP.
    Conservative,
    /// Mid-range limits, 60% minimum PoP.
    Moderate,
    /// Wide limits, 50% minimum PoP.
    Aggressive,
}

impl RiskProfile {
    /// Greeks ceilings for this profile.
    #[must_use]
    pub const fn greeks_limits(&self) -> GreeksLimits {
        match self {
            Self::Conservative => GreeksLimits {
                max_delta: 50.0,
                max_gamma: 5.0,
                max_theta: 100.0,
                max_vega: 200.0,
            },
            Self::Moderate => GreeksLimits {
                max_delta: 100.0,
                max_gamma: 10.0,
                max_theta: 250.0,
                max_vega: 500.0,
            },
            Self::Aggressive => GreeksLimits {
                max_delta: 250.0,
                max_gamma: 25.0,
                max_theta: 500.0,
                max_vega: 1000.0,
            },
        }
    }

    /// Minimum acceptable probability of profit at expiration (fraction).
    #[must_use]
    pub const fn min_pop(&self) -> f64 {
        match self {
            Self::Conservative => 0.70,
            Self::Moderate => 0.60,
            Self::Aggressive => 0.50,
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conservative => write!(f, "conservative"),
            Self::Moderate => write!(f, "moderate"),
            Self::Aggressive => write!(f, "aggressive"),
        }
    }
}

/// Position-count concentration thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcentrationLimits {
    /// Maximum legs on a single underlying before warning.
    pub max_per_symbol: usize,
    /// Maximum legs sharing one expiration date before warning.
    pub max_per_expiry: usize,
    /// Maximum legs sharing one exact strike before warning.
    pub max_per_strike: usize,
}

impl Default for ConcentrationLimits {
    fn default() -> Self {
        Self {
            max_per_symbol: 3,
            max_per_expiry: 5,
            max_per_strike: 3,
        }
    }
}
