//! Bounded stochastic distributions for cycle lengths and request sizing.
//!
//! Policies never talk to the raw generator; they carry one of these
//! distributions and sample it against the context's `RngManager`. Same
//! seed + same configuration → same draws.
//!
//! # Variants
//!
//! - `Fixed`: the same value on every draw
//! - `Uniform`: uniform over an inclusive range
//! - `Normal`: truncated normal; values outside the inclusive
//!   [low, high] window are rejected and redrawn
//!
//! # Example
//!
//! ```
//! use resource_exchange_core_rs::rng::RngManager;
//! use resource_exchange_core_rs::rng::distributions::IntDistribution;
//!
//! let mut rng = RngManager::new(42);
//! let dist = IntDistribution::uniform(2, 10);
//! let cycle_length = dist.sample(&mut rng);
//! assert!((2..=10).contains(&cycle_length));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::RngManager;

/// Errors raised when constructing a distribution
#[derive(Debug, Error, PartialEq)]
pub enum DistributionError {
    #[error(
        "min and max cannot be equal for a normal distribution ({low}); \
         use a fixed distribution instead"
    )]
    DegenerateBounds { low: f64 },
}

/// Integer-valued distribution (cycle lengths)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IntDistribution {
    /// Always returns the same value
    Fixed { value: i64 },

    /// Uniform over [min, max] inclusive
    Uniform { min: i64, max: i64 },

    /// Normal with inclusive truncation window [low, high].
    /// Draws outside the window are rejected and redrawn.
    Normal {
        mean: f64,
        std_dev: f64,
        low: i64,
        high: i64,
    },
}

impl IntDistribution {
    pub fn fixed(value: i64) -> Self {
        IntDistribution::Fixed { value }
    }

    pub fn uniform(min: i64, max: i64) -> Self {
        IntDistribution::Uniform { min, max }
    }

    /// Truncated normal over [low, high] inclusive.
    ///
    /// Fails when `low == high`; warns (non-fatal) when the window lies
    /// more than 3 standard deviations from the mean, where rejection
    /// sampling becomes inefficient.
    pub fn normal(mean: f64, std_dev: f64, low: i64, high: i64) -> Result<Self, DistributionError> {
        if low == high {
            return Err(DistributionError::DegenerateBounds { low: low as f64 });
        }
        warn_if_far_tail(mean, std_dev, low as f64, high as f64);
        Ok(IntDistribution::Normal {
            mean,
            std_dev,
            low,
            high,
        })
    }

    /// Draw one sample
    pub fn sample(&self, rng: &mut RngManager) -> i64 {
        match self {
            IntDistribution::Fixed { value } => *value,
            IntDistribution::Uniform { min, max } => rng.range_i64(*min, *max),
            IntDistribution::Normal {
                mean,
                std_dev,
                low,
                high,
            } => loop {
                let draw = rng.normal(*mean, *std_dev).round() as i64;
                if draw >= *low && draw <= *high {
                    return draw;
                }
            },
        }
    }

    /// Theoretical maximum of the distribution
    pub fn max(&self) -> i64 {
        match self {
            IntDistribution::Fixed { value } => *value,
            IntDistribution::Uniform { max, .. } => *max,
            IntDistribution::Normal { high, .. } => *high,
        }
    }
}

/// Real-valued distribution (request-size fractions, fill masses)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RealDistribution {
    /// Always returns the same value
    Fixed { value: f64 },

    /// Uniform over [min, max)
    Uniform { min: f64, max: f64 },

    /// Normal with inclusive truncation window [low, high]
    Normal {
        mean: f64,
        std_dev: f64,
        low: f64,
        high: f64,
    },
}

impl RealDistribution {
    pub fn fixed(value: f64) -> Self {
        RealDistribution::Fixed { value }
    }

    pub fn uniform(min: f64, max: f64) -> Self {
        RealDistribution::Uniform { min, max }
    }

    /// Truncated normal over [low, high] inclusive.
    ///
    /// Fails when `low == high`; warns (non-fatal) when the window lies
    /// more than 3 standard deviations from the mean.
    pub fn normal(mean: f64, std_dev: f64, low: f64, high: f64) -> Result<Self, DistributionError> {
        if low == high {
            return Err(DistributionError::DegenerateBounds { low });
        }
        warn_if_far_tail(mean, std_dev, low, high);
        Ok(RealDistribution::Normal {
            mean,
            std_dev,
            low,
            high,
        })
    }

    /// Draw one sample
    pub fn sample(&self, rng: &mut RngManager) -> f64 {
        match self {
            RealDistribution::Fixed { value } => *value,
            RealDistribution::Uniform { min, max } => rng.range_f64(*min, *max),
            RealDistribution::Normal {
                mean,
                std_dev,
                low,
                high,
            } => loop {
                let draw = rng.normal(*mean, *std_dev);
                if draw >= *low && draw <= *high {
                    return draw;
                }
            },
        }
    }

    /// Theoretical maximum of the distribution
    pub fn max(&self) -> f64 {
        match self {
            RealDistribution::Fixed { value } => *value,
            RealDistribution::Uniform { max, .. } => *max,
            RealDistribution::Normal { high, .. } => *high,
        }
    }
}

/// Advisory only: a truncation window entirely beyond 3σ of the mean
/// makes rejection sampling slow but is not an error.
fn warn_if_far_tail(mean: f64, std_dev: f64, low: f64, high: f64) {
    if high < mean - 3.0 * std_dev || low > mean + 3.0 * std_dev {
        log::warn!(
            "truncated normal window [{}, {}] lies more than 3 standard deviations \
             from mean {}; sampling may be inefficient",
            low,
            high,
            mean
        );
    }
}
