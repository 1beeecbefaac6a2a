//! Trading policies: the per-step buy/sell decision logic.
//!
//! A buy policy turns inventory shortfall into solver-facing request
//! portfolios and settles accepted trades back into its buffer. A sell
//! policy turns buffer contents into bids against outstanding requests
//! and ships popped material on settlement. Both are configured once
//! through a validated config struct and then driven step by step by the
//! external exchange loop.
//!
//! Configuration errors surface immediately at `init`, before any state
//! mutation. Settlement anomalies (unfillable packages, transport
//! shortfall) are absorbed with defined fallbacks and never abort a
//! simulation step.

pub mod buy;
pub mod cycle;
pub mod sell;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::buffer::BufferError;
use crate::models::composition::Composition;
use crate::models::tracker::TrackerError;
use crate::rng::distributions::DistributionError;

pub use buy::{BuyPolicy, BuyPolicyConfig};
pub use cycle::CycleScheduler;
pub use sell::{SellPolicy, SellPolicyConfig};

/// Errors raised while configuring or settling a trading policy
#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("quantize must be nonzero")]
    ZeroQuantize,

    #[error("invalid inventory policy '{0}' (expected \"ss\", \"rq\", or \"qr\")")]
    InvalidInventoryPolicy(String),

    #[error("total inventory tracker does not contain the policy's buffer")]
    TrackerMissingBuffer,

    #[error("request size distribution cannot have a max greater than 1, got {0}")]
    SizeDistAboveUnity(f64),

    #[error("unknown package '{0}'")]
    UnknownPackage(String),

    #[error("unknown transport unit '{0}'")]
    UnknownTransportUnit(String),

    #[error("package strategy '{strategy}' is not allowed for sell policies with quantize")]
    DisallowedPackageStrategy { strategy: &'static str },

    #[error(
        "quantize {quantize} is not fully packagable based on fill min/max \
         values ({fill_min}, {fill_max})"
    )]
    UnpackagableQuantize {
        quantize: f64,
        fill_min: f64,
        fill_max: f64,
    },

    #[error(
        "quantize {quantize} packages cannot be shipped according to transport \
         unit fill min/max values ({fill_min}, {fill_max})"
    )]
    UnshippableQuantize {
        quantize: f64,
        fill_min: usize,
        fill_max: usize,
    },

    #[error(transparent)]
    Distribution(#[from] DistributionError),

    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

/// Buy-side per-commodity detail: the composition to request and the
/// preference weight the solver uses to break ties (higher wins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommodityDetail {
    pub comp: Composition,
    pub pref: f64,
}
