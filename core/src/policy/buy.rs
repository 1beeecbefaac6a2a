//! Buy-side trading policy.
//!
//! A buy policy keeps one inventory buffer filled: each step it measures
//! the shortfall against its (s, S) thresholds, sizes a request batch,
//! and emits one request portfolio per indivisible chunk. Accepted
//! trades are pushed back into the buffer at settlement.
//!
//! All knobs live in [`BuyPolicyConfig`] and are validated in one place,
//! [`BuyPolicy::init`]; a constructed policy is always internally
//! consistent.

use std::collections::BTreeMap;

use crate::context::ContextHandle;
use crate::exchange::{RequestPortfolio, Trade};
use crate::models::buffer::BufferHandle;
use crate::models::{Composition, Resource, TotalInvTracker};
use crate::policy::cycle::CycleScheduler;
use crate::policy::{CommodityDetail, PolicyError};
use crate::rng::distributions::{IntDistribution, RealDistribution};

/// Buy policy configuration. Fields default to "no constraint";
/// validation happens once in [`BuyPolicy::init`].
///
/// # Example
/// ```
/// use resource_exchange_core_rs::policy::BuyPolicyConfig;
///
/// // (s, S) policy: request up to 100 kg whenever stock drops to 20 kg
/// let config = BuyPolicyConfig::default()
///     .inventory_policy("ss", 100.0, 20.0)
///     .unwrap();
/// assert_eq!(config.fill_to, 100.0);
/// assert_eq!(config.req_at, 20.0);
/// ```
#[derive(Debug, Clone)]
pub struct BuyPolicyConfig {
    /// Per-step request ceiling (kg)
    pub throughput: f64,
    /// Indivisible request chunk size; non-positive disables chunking
    pub quantize: f64,
    /// Inventory level requests aim to restore (S)
    pub fill_to: f64,
    /// Inventory level at or below which requests are made (s)
    pub req_at: f64,
    /// Per-cycle intake cap; reaching it starts a dormant window
    pub cumulative_cap: Option<f64>,
    /// Active window length draw
    pub active: IntDistribution,
    /// Dormant window length draw; a negative draw means always active
    pub dormant: IntDistribution,
    /// Fraction of the computed request amount actually asked for
    pub request_size: RealDistribution,
}

impl Default for BuyPolicyConfig {
    fn default() -> Self {
        Self {
            throughput: f64::MAX,
            quantize: -1.0,
            fill_to: f64::MAX,
            req_at: f64::MAX,
            cumulative_cap: None,
            active: IntDistribution::fixed(1),
            dormant: IntDistribution::fixed(-1),
            request_size: RealDistribution::fixed(1.0),
        }
    }
}

impl BuyPolicyConfig {
    /// Set thresholds from an inventory-policy keyword:
    ///
    /// - `"ss"`: (s, S) — request up to `fill` when stock is at or below
    ///   `req_at`
    /// - `"rq"` / `"qr"`: (R, Q) — request chunks of `fill` when stock is
    ///   at or below `req_at`
    ///
    /// Keywords are case-insensitive; anything else is an error.
    pub fn inventory_policy(
        mut self,
        kind: &str,
        fill: f64,
        req_at: f64,
    ) -> Result<Self, PolicyError> {
        match kind.to_lowercase().as_str() {
            "ss" => {
                self.req_at = req_at;
                self.fill_to = fill;
            }
            "rq" | "qr" => {
                self.req_at = req_at;
                self.quantize = fill;
                self.fill_to = req_at + fill;
            }
            _ => return Err(PolicyError::InvalidInventoryPolicy(kind.to_string())),
        }
        Ok(self)
    }
}

/// Buy-side trading policy bound to one buffer
#[derive(Debug)]
pub struct BuyPolicy {
    ctx: ContextHandle,
    agent_id: String,
    name: String,
    buf: BufferHandle,
    tracker: TotalInvTracker,
    throughput: f64,
    quantize: f64,
    fill_to: f64,
    req_at: f64,
    cumulative_cap: Option<f64>,
    /// Mass accepted so far in the current cap cycle
    cycle_total_inv: f64,
    size_dist: RealDistribution,
    scheduler: CycleScheduler,
    commodities: BTreeMap<String, CommodityDetail>,
    started: bool,
}

impl BuyPolicy {
    /// Validate `config` and bind a policy to `buf`.
    ///
    /// `tracker` shares a total-inventory cap across several buffers;
    /// pass `None` to track only `buf` at its own capacity. Thresholds
    /// are clamped to the buffer capacity so a constructed policy never
    /// over-requests.
    pub fn init(
        ctx: ContextHandle,
        agent_id: &str,
        buf: BufferHandle,
        name: &str,
        tracker: Option<TotalInvTracker>,
        config: BuyPolicyConfig,
    ) -> Result<Self, PolicyError> {
        let capacity = buf.borrow().capacity();

        if config.throughput < 0.0 {
            return Err(PolicyError::Negative {
                field: "throughput",
                value: config.throughput,
            });
        }
        if config.quantize == 0.0 {
            return Err(PolicyError::ZeroQuantize);
        }
        if config.fill_to <= 0.0 {
            return Err(PolicyError::NonPositive {
                field: "fill_to",
                value: config.fill_to,
            });
        }
        if config.req_at < 0.0 {
            return Err(PolicyError::Negative {
                field: "req_at",
                value: config.req_at,
            });
        }
        if let Some(cap) = config.cumulative_cap {
            if cap <= 0.0 {
                return Err(PolicyError::NonPositive {
                    field: "cumulative_cap",
                    value: cap,
                });
            }
        }
        if config.request_size.max() > 1.0 {
            return Err(PolicyError::SizeDistAboveUnity(config.request_size.max()));
        }

        let tracker = match tracker {
            Some(t) => {
                if !t.contains(&buf) {
                    return Err(PolicyError::TrackerMissingBuffer);
                }
                t
            }
            None => TotalInvTracker::single(buf.clone()),
        };

        log::warn!(
            "policy {}:{} uses the trading-policy API, which is experimental \
             and may change",
            agent_id,
            name
        );
        let use_cumulative_cap = config.cumulative_cap.is_some();

        let scheduler = {
            let mut ctx_ref = ctx.borrow_mut();
            CycleScheduler::init(
                &mut ctx_ref,
                agent_id,
                name,
                config.active,
                config.dormant,
                use_cumulative_cap,
            )
        };

        Ok(Self {
            ctx,
            agent_id: agent_id.to_string(),
            name: name.to_string(),
            buf,
            tracker,
            throughput: config.throughput,
            quantize: config.quantize,
            fill_to: config.fill_to.min(capacity),
            req_at: config.req_at.min(capacity),
            cumulative_cap: config.cumulative_cap.map(|cap| cap.min(capacity)),
            cycle_total_inv: 0.0,
            size_dist: config.request_size,
            scheduler,
            commodities: BTreeMap::new(),
            started: false,
        })
    }

    /// Request `commodity` with a trace composition and default preference
    pub fn set_commodity(&mut self, commodity: &str) {
        self.set_commodity_with(commodity, Composition::trace(), 1.0);
    }

    /// Request `commodity` with an explicit composition and preference
    pub fn set_commodity_with(&mut self, commodity: &str, comp: Composition, pref: f64) {
        self.commodities
            .insert(commodity.to_string(), CommodityDetail { comp, pref });
    }

    pub fn unset_commodity(&mut self, commodity: &str) {
        self.commodities.remove(commodity);
    }

    /// Register as a trader; idempotent
    pub fn start(&mut self) {
        self.ctx
            .borrow_mut()
            .register_trader(&self.agent_id, &self.name);
        self.started = true;
    }

    /// Unregister as a trader; idempotent
    pub fn stop(&mut self) {
        self.ctx
            .borrow_mut()
            .unregister_trader(&self.agent_id, &self.name);
        self.started = false;
    }

    /// Restore all behavior knobs to their unconstrained defaults and
    /// zero the cycle intake accounting. Scheduled windows are untouched.
    pub fn reset_behavior(&mut self) {
        self.throughput = f64::MAX;
        self.quantize = -1.0;
        self.fill_to = f64::MAX;
        self.req_at = f64::MAX;
        self.cumulative_cap = None;
        self.cycle_total_inv = 0.0;
        self.size_dist = RealDistribution::fixed(1.0);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn quantize(&self) -> f64 {
        self.quantize
    }

    pub fn fill_to(&self) -> f64 {
        self.fill_to
    }

    pub fn req_at(&self) -> f64 {
        self.req_at
    }

    pub fn throughput(&self) -> f64 {
        self.throughput
    }

    pub fn cumulative_cap(&self) -> Option<f64> {
        self.cumulative_cap
    }

    pub fn cycle_total_inv(&self) -> f64 {
        self.cycle_total_inv
    }

    pub fn scheduler(&self) -> &CycleScheduler {
        &self.scheduler
    }

    /// Requests are indivisible chunks
    pub fn excl(&self) -> bool {
        self.quantize > 0.0
    }

    /// Whether stock has dropped to the request threshold
    fn make_req(&self) -> bool {
        self.tracker.quantity() <= self.req_at
    }

    /// Largest restock amount every constraint allows this step
    fn total_available(&self) -> f64 {
        let shortfall = self.fill_to - self.tracker.quantity();
        shortfall
            .min(self.buf.borrow().space())
            .min(self.tracker.space())
            .min(self.throughput)
            .max(0.0)
    }

    /// Build this step's request portfolios.
    ///
    /// Empty when stock sits above `req_at`, during a dormant window, or
    /// when the computed amount falls under the request epsilon. With
    /// quantize set, the amount is split into `ceil(amt / quantize)`
    /// portfolios of chunk size with the last one truncated; each
    /// portfolio requests every configured commodity mutually, so the
    /// solver fills a chunk from exactly one of them.
    pub fn material_requests(&mut self) -> Vec<RequestPortfolio> {
        let mut amt = 0.0;
        {
            let mut ctx = self.ctx.borrow_mut();
            let time = ctx.time();
            let max_request_amt = self
                .cumulative_cap
                .map_or(f64::MAX, |cap| cap - self.cycle_total_inv);
            if self.make_req() && !self.scheduler.dormant(time) {
                let frac = self.size_dist.sample(ctx.rng());
                amt = (self.total_available() * frac).min(max_request_amt);
            } else {
                log::debug!(
                    "policy {}:{} requests nothing at {} (dormant or stocked)",
                    self.agent_id,
                    self.name,
                    time
                );
            }
            self.scheduler.step(&mut ctx);
        }

        if amt < crate::EPS {
            return Vec::new();
        }

        let excl = self.excl();
        let n_req = if excl {
            (amt / self.quantize).ceil() as usize
        } else {
            1
        };

        let mut portfolios = Vec::with_capacity(n_req);
        for i in 0..n_req {
            let req_amt = if excl {
                if i + 1 == n_req {
                    (amt - self.quantize * (n_req as f64 - 1.0)).max(0.0)
                } else {
                    self.quantize
                }
            } else {
                amt
            };

            let mut port = RequestPortfolio::new();
            let mut ids = Vec::with_capacity(self.commodities.len());
            for (commodity, detail) in &self.commodities {
                let target = Resource::new(req_amt, detail.comp.clone());
                ids.push(port.add_request(target, &self.agent_id, commodity, detail.pref, excl));
            }
            port.add_mutual_requests(&ids);
            portfolios.push(port);
        }
        portfolios
    }

    /// Settle accepted trades: push each delivered resource into the
    /// buffer and account it against the cumulative cap. Reaching the cap
    /// starts the dormant window and resets the cycle intake.
    pub fn accept_trades(&mut self, responses: &[(Trade, Resource)]) -> Result<(), PolicyError> {
        for (trade, delivered) in responses {
            log::debug!(
                "policy {}:{} got {} kg of {}",
                self.agent_id,
                self.name,
                delivered.quantity(),
                trade.request.commodity
            );
            self.buf.borrow_mut().push(delivered.clone())?;
            if self.cumulative_cap.is_some() {
                self.cycle_total_inv += delivered.quantity();
            }
        }

        if let Some(cap) = self.cumulative_cap {
            if cap - self.cycle_total_inv < crate::EPS_RSRC {
                let mut ctx = self.ctx.borrow_mut();
                log::info!(
                    "policy {}:{} reached cumulative cap {} at {}, going dormant",
                    self.agent_id,
                    self.name,
                    cap,
                    ctx.time()
                );
                self.scheduler.begin_dormancy_after_cap(&mut ctx);
                self.cycle_total_inv = 0.0;
            }
        }
        Ok(())
    }
}

impl Drop for BuyPolicy {
    fn drop(&mut self) {
        if self.started {
            if let Ok(mut ctx) = self.ctx.try_borrow_mut() {
                ctx.unregister_trader(&self.agent_id, &self.name);
            }
        }
    }
}
