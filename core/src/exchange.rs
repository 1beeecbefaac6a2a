//! Solver-facing exchange protocol.
//!
//! The matching solver itself is an external collaborator; this module
//! only defines the data it consumes and produces. Buy policies emit
//! `RequestPortfolio`s, sell policies answer with `BidPortfolio`s, and
//! the solver hands back `Trade`s for settlement. Within one portfolio,
//! requests placed in the same mutual group must be satisfied together
//! or not at all.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::Resource;

/// One commodity request inside a portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Target resource (quantity + preferred composition)
    pub resource: Resource,
    /// Requesting agent id
    pub requester: String,
    pub commodity: String,
    /// Unitless preference weight; higher wins ties in the solver
    pub preference: f64,
    /// Must be satisfied in indivisible chunks of the given quantity
    pub exclusive: bool,
}

/// Handle to a request within its portfolio
pub type RequestId = usize;

/// Group of requests issued together by one buy policy for one step.
///
/// # Example
/// ```
/// use resource_exchange_core_rs::exchange::RequestPortfolio;
/// use resource_exchange_core_rs::models::{Composition, Resource};
///
/// let mut port = RequestPortfolio::new();
/// let a = port.add_request(
///     Resource::new(10.0, Composition::trace()),
///     "reactor-1",
///     "uox",
///     1.0,
///     false,
/// );
/// let b = port.add_request(
///     Resource::new(10.0, Composition::trace()),
///     "reactor-1",
///     "mox",
///     0.5,
///     false,
/// );
/// port.add_mutual_requests(&[a, b]);
/// assert_eq!(port.mutual_groups().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestPortfolio {
    requests: Vec<Request>,
    mutual_groups: Vec<Vec<RequestId>>,
}

impl RequestPortfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one request and return its handle
    pub fn add_request(
        &mut self,
        resource: Resource,
        requester: &str,
        commodity: &str,
        preference: f64,
        exclusive: bool,
    ) -> RequestId {
        self.requests.push(Request {
            resource,
            requester: requester.to_string(),
            commodity: commodity.to_string(),
            preference,
            exclusive,
        });
        self.requests.len() - 1
    }

    /// Mark a set of requests as mutual: the solver satisfies all of
    /// them together or none
    pub fn add_mutual_requests(&mut self, ids: &[RequestId]) {
        if ids.len() > 1 {
            self.mutual_groups.push(ids.to_vec());
        }
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn mutual_groups(&self) -> &[Vec<RequestId>] {
        &self.mutual_groups
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// One offer against a specific request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    /// The request this bid answers
    pub request: Request,
    /// Offered resource (quantity + composition as it would ship)
    pub offer: Resource,
    /// Offering agent id
    pub bidder: String,
    /// Offer is an indivisible chunk
    pub exclusive: bool,
}

/// Group of bids issued together by one sell policy for one step,
/// with shared capacity constraints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BidPortfolio {
    bids: Vec<Bid>,
    /// Total-quantity caps the solver must respect across the portfolio
    constraints: Vec<f64>,
}

impl BidPortfolio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_bid(&mut self, request: &Request, offer: Resource, bidder: &str, exclusive: bool) {
        self.bids.push(Bid {
            request: request.clone(),
            offer,
            bidder: bidder.to_string(),
            exclusive,
        });
    }

    pub fn add_constraint(&mut self, capacity: f64) {
        self.constraints.push(capacity);
    }

    pub fn bids(&self) -> &[Bid] {
        &self.bids
    }

    pub fn constraints(&self) -> &[f64] {
        &self.constraints
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty()
    }
}

/// A solver-resolved match: the originating request and the agreed
/// amount. Settlement pairs each trade with the delivered resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub request: Request,
    pub amt: f64,
}

/// Outstanding requests grouped by commodity, as handed to sell
/// policies each step
pub type CommodityRequests = HashMap<String, Vec<Request>>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Composition;

    #[test]
    fn test_mutual_group_needs_two_requests() {
        let mut port = RequestPortfolio::new();
        let only = port.add_request(
            Resource::new(1.0, Composition::trace()),
            "a",
            "uox",
            1.0,
            false,
        );
        port.add_mutual_requests(&[only]);
        assert!(port.mutual_groups().is_empty());
    }

    #[test]
    fn test_bid_portfolio_constraint() {
        let mut port = BidPortfolio::new();
        port.add_constraint(50.0);
        assert_eq!(port.constraints(), &[50.0]);
        assert!(port.is_empty());
    }
}
