//! Sell-side trading policy.
//!
//! A sell policy drains one inventory buffer: each step it answers the
//! outstanding requests for its commodities with bids sized by its
//! throughput, quantize, and packaging constraints, then ships popped
//! (and possibly repackaged) material at settlement.
//!
//! Packaging and transport names are resolved against the context
//! registries once at [`SellPolicy::init`], where every incompatibility
//! between quantize and the package or transport unit is rejected.

use std::collections::BTreeSet;
use std::rc::Rc;

use crate::context::ContextHandle;
use crate::exchange::{BidPortfolio, CommodityRequests, Trade};
use crate::models::buffer::BufferHandle;
use crate::models::Resource;
use crate::packaging::{Package, TransportUnit};
use crate::policy::PolicyError;

/// Sell policy configuration. Fields default to "no constraint";
/// validation happens once in [`SellPolicy::init`].
#[derive(Debug, Clone)]
pub struct SellPolicyConfig {
    /// Per-step bid ceiling (kg)
    pub throughput: f64,
    /// Indivisible bid chunk size; 0 disables chunking
    pub quantize: f64,
    /// Offer the requester's composition instead of the buffer's
    pub ignore_comp: bool,
    /// Package to ship in; `None` means unpackaged
    pub package: Option<String>,
    /// Transport unit to ship with; `None` means unrestricted
    pub transport_unit: Option<String>,
}

impl Default for SellPolicyConfig {
    fn default() -> Self {
        Self {
            throughput: f64::MAX,
            quantize: 0.0,
            ignore_comp: false,
            package: None,
            transport_unit: None,
        }
    }
}

/// Sell-side trading policy bound to one buffer
#[derive(Debug)]
pub struct SellPolicy {
    ctx: ContextHandle,
    agent_id: String,
    name: String,
    buf: BufferHandle,
    throughput: f64,
    quantize: f64,
    ignore_comp: bool,
    package: Rc<Package>,
    transport_unit: Rc<TransportUnit>,
    commodities: BTreeSet<String>,
    started: bool,
}

impl SellPolicy {
    /// Validate `config`, resolve its package and transport-unit names,
    /// and bind a policy to `buf`.
    ///
    /// With quantize set, the package must produce exactly one full unit
    /// per chunk (deterministic fill strategies only) and the transport
    /// unit must be able to ship every chunk of a bid round; anything
    /// else would strand mass and is rejected here.
    pub fn init(
        ctx: ContextHandle,
        agent_id: &str,
        buf: BufferHandle,
        name: &str,
        config: SellPolicyConfig,
    ) -> Result<Self, PolicyError> {
        log::warn!(
            "policy {}:{} uses the trading-policy API, which is experimental \
             and may change",
            agent_id,
            name
        );
        if config.throughput < 0.0 {
            return Err(PolicyError::Negative {
                field: "throughput",
                value: config.throughput,
            });
        }
        if config.quantize < 0.0 {
            return Err(PolicyError::Negative {
                field: "quantize",
                value: config.quantize,
            });
        }

        let package = match &config.package {
            Some(pkg_name) => ctx
                .borrow()
                .get_package(pkg_name)
                .ok_or_else(|| PolicyError::UnknownPackage(pkg_name.clone()))?,
            None => {
                // the sentinel is pre-registered
                ctx.borrow()
                    .get_package(Package::UNPACKAGED_NAME)
                    .ok_or_else(|| PolicyError::UnknownPackage(Package::UNPACKAGED_NAME.into()))?
            }
        };
        if config.quantize > 0.0 && !package.is_unpackaged() {
            if !package.strategy().is_deterministic() {
                return Err(PolicyError::DisallowedPackageStrategy {
                    strategy: package.strategy().as_str(),
                });
            }
            let fills = package.fill_mass(config.quantize, ctx.borrow_mut().rng());
            let whole = fills.len() == 1 && fills[0] % config.quantize < crate::EPS_RSRC;
            if !whole {
                return Err(PolicyError::UnpackagableQuantize {
                    quantize: config.quantize,
                    fill_min: package.fill_min(),
                    fill_max: package.fill_max(),
                });
            }
        }

        let transport_unit = match &config.transport_unit {
            Some(tu_name) => ctx
                .borrow()
                .get_transport_unit(tu_name)
                .ok_or_else(|| PolicyError::UnknownTransportUnit(tu_name.clone()))?,
            None => ctx
                .borrow()
                .get_transport_unit(TransportUnit::UNRESTRICTED_NAME)
                .ok_or_else(|| {
                    PolicyError::UnknownTransportUnit(TransportUnit::UNRESTRICTED_NAME.into())
                })?,
        };
        if config.quantize > 0.0 && !transport_unit.is_unrestricted() {
            let n_pkgs = package
                .fill_mass(config.quantize, ctx.borrow_mut().rng())
                .len();
            if transport_unit.max_shippable_packages(n_pkgs) != n_pkgs {
                return Err(PolicyError::UnshippableQuantize {
                    quantize: config.quantize,
                    fill_min: transport_unit.fill_min(),
                    fill_max: transport_unit.fill_max(),
                });
            }
        }

        Ok(Self {
            ctx,
            agent_id: agent_id.to_string(),
            name: name.to_string(),
            buf,
            throughput: config.throughput,
            quantize: config.quantize,
            ignore_comp: config.ignore_comp,
            package,
            transport_unit,
            commodities: BTreeSet::new(),
            started: false,
        })
    }

    /// Offer under `commodity`
    pub fn set_commodity(&mut self, commodity: &str) {
        self.commodities.insert(commodity.to_string());
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

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn quantize(&self) -> f64 {
        self.quantize
    }

    pub fn throughput(&self) -> f64 {
        self.throughput
    }

    /// Bids are indivisible chunks
    pub fn excl(&self) -> bool {
        self.quantize > 0.0
    }

    /// Largest mass biddable this step: held quantity rounded down to a
    /// whole number of chunks when quantized, capped by throughput
    pub fn limit(&self) -> f64 {
        let qty = self.buf.borrow().quantity();
        let biddable = if self.excl() {
            self.quantize * (qty / self.quantize).floor()
        } else {
            qty
        };
        biddable.min(self.throughput)
    }

    /// Build this step's bid portfolios against the outstanding requests.
    ///
    /// Returns nothing when the buffer is effectively empty or the limit
    /// falls under the bid epsilon. Otherwise one portfolio carries a
    /// capacity constraint at the limit plus, per request for a
    /// configured commodity, one bid per package-sized (or quantize-
    /// sized) chunk, clipped to what the transport unit can ship.
    pub fn material_bids(&mut self, requests: &CommodityRequests) -> Vec<BidPortfolio> {
        let limit = self.limit();
        {
            let buf = self.buf.borrow();
            if buf.is_empty() || buf.quantity() < crate::EPS || limit < crate::EPS {
                return Vec::new();
            }
        }

        let mut port = BidPortfolio::new();
        port.add_constraint(limit);
        let excl = self.excl();

        for commodity in &self.commodities {
            let Some(commodity_requests) = requests.get(commodity) else {
                continue;
            };
            for request in commodity_requests {
                let qty = request.resource.quantity().min(limit);
                let mut chunks = if excl {
                    let n_full = (qty / self.quantize).floor() as usize;
                    vec![self.quantize; n_full]
                } else {
                    self.package.fill_mass(qty, self.ctx.borrow_mut().rng())
                };

                let shippable = self.transport_unit.max_shippable_packages(chunks.len());
                if shippable < chunks.len() {
                    log::debug!(
                        "policy {}:{} clips bid from {} to {} packages for {}",
                        self.agent_id,
                        self.name,
                        chunks.len(),
                        shippable,
                        commodity
                    );
                    chunks.truncate(shippable);
                }

                let offered_comp = if self.ignore_comp {
                    request.resource.comp().clone()
                } else {
                    match self.buf.borrow().peek() {
                        Some(oldest) => oldest.comp().clone(),
                        None => continue,
                    }
                };
                for chunk in chunks {
                    let offer = Resource::new(chunk, offered_comp.clone());
                    port.add_bid(request, offer, &self.agent_id, excl);
                }
            }
        }

        vec![port]
    }

    /// Settle resolved trades: pop each trade's mass off the buffer,
    /// repackage it when the ship package differs from the held one, and
    /// pair it with its trade.
    ///
    /// Trades beyond what the transport unit can carry this round get
    /// nothing. A repackaging that yields no full unit ships an empty
    /// resource; unpackaged remainder above the resource epsilon goes
    /// back into the buffer. With `ignore_comp`, shipped material whose
    /// mass profile already matches the requested composition within
    /// tolerance is relabeled with it; a mismatched profile always ships
    /// as-is.
    pub fn trade_responses(
        &mut self,
        trades: &[Trade],
    ) -> Result<Vec<(Trade, Resource)>, PolicyError> {
        let mut shippable = self.transport_unit.max_shippable_packages(trades.len());
        let mut responses = Vec::with_capacity(trades.len());

        for trade in trades {
            if shippable == 0 {
                log::debug!(
                    "policy {}:{} out of transport capacity, dropping remaining trades",
                    self.agent_id,
                    self.name
                );
                break;
            }

            let mut popped = self.buf.borrow_mut().pop(trade.amt, crate::EPS_RSRC)?;
            let mut shipped = if self.package.name() != popped.package_name() {
                let fallback_comp = popped.comp().clone();
                let mut units = popped.package_into(&self.package, self.ctx.borrow_mut().rng());
                if popped.quantity() > crate::EPS_RSRC {
                    self.buf.borrow_mut().push(popped)?;
                }
                if units.is_empty() {
                    Resource::empty(fallback_comp)
                } else {
                    shippable -= 1;
                    units.swap_remove(0)
                }
            } else {
                popped
            };

            if self.ignore_comp
                && shipped
                    .comp()
                    .almost_eq(trade.request.resource.comp(), crate::EPS_RSRC)
            {
                shipped.transmute(trade.request.resource.comp().clone());
            }
            responses.push((trade.clone(), shipped));
        }
        Ok(responses)
    }
}

impl Drop for SellPolicy {
    fn drop(&mut self) {
        if self.started {
            if let Ok(mut ctx) = self.ctx.try_borrow_mut() {
                ctx.unregister_trader(&self.agent_id, &self.name);
            }
        }
    }
}
