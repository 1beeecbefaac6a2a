//! Trading and procurement core for an agent-based discrete-event
//! resource-exchange simulator.
//!
//! Agents delegate their market participation to policy objects: a
//! [`policy::BuyPolicy`] keeps an inventory buffer filled by issuing
//! request portfolios, a [`policy::SellPolicy`] drains one by bidding
//! against outstanding requests and shipping popped material. The
//! [`context::SimContext`] owns the clock, the deterministic RNG stream,
//! the trader registry, and the packaging registries; an external driver
//! advances it step by step and runs the matching solver between the
//! request and bid rounds.
//!
//! Everything is single-threaded and deterministic: the same seed and
//! the same configuration replay the same run.

pub mod context;
pub mod exchange;
pub mod models;
pub mod packaging;
pub mod policy;
pub mod rng;

pub use context::{ContextHandle, SimContext};
pub use exchange::{Bid, BidPortfolio, CommodityRequests, Request, RequestPortfolio, Trade};
pub use models::{
    Composition, Event, EventLog, Resource, ResourceBuffer, TotalInvTracker, WindowKind,
};
pub use packaging::{FillStrategy, LoadStrategy, Package, TransportUnit};
pub use policy::{BuyPolicy, BuyPolicyConfig, PolicyError, SellPolicy, SellPolicyConfig};
pub use rng::RngManager;

/// Request/bid cutoff: amounts under this are not worth trading
pub const EPS: f64 = 1e-6;

/// Resource accounting tolerance for pushes, pops, and remainders
pub const EPS_RSRC: f64 = 1e-6;
