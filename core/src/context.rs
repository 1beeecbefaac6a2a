//! Simulation context: the clock, trader registry, packaging
//! registries, event log, and the single deterministic RNG stream.
//!
//! The context stands in for the external event scheduler. The driver
//! owns it, advances its clock once per step, and hands shared handles
//! to every policy. Execution is single-threaded and step-driven, so
//! handles are `Rc<RefCell<_>>`, never locks.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use crate::models::{Event, EventLog, WindowKind};
use crate::packaging::{Package, TransportUnit};
use crate::rng::RngManager;

/// Shared single-threaded handle to the context
pub type ContextHandle = Rc<RefCell<SimContext>>;

/// Owning state object for one simulation run.
///
/// # Example
/// ```
/// use resource_exchange_core_rs::context::SimContext;
///
/// let ctx = SimContext::handle(42);
/// assert_eq!(ctx.borrow().time(), 0);
/// ctx.borrow_mut().advance_time();
/// assert_eq!(ctx.borrow().time(), 1);
/// ```
#[derive(Debug)]
pub struct SimContext {
    time: i64,
    rng: RngManager,
    /// (agent id, policy name) pairs currently registered as traders
    traders: BTreeSet<(String, String)>,
    packages: HashMap<String, Rc<Package>>,
    transport_units: HashMap<String, Rc<TransportUnit>>,
    events: EventLog,
}

impl SimContext {
    /// Create a context at time 0 with a seeded RNG stream.
    /// The "unpackaged" and "unrestricted" sentinels are pre-registered.
    pub fn new(seed: u64) -> Self {
        let mut packages = HashMap::new();
        packages.insert(
            Package::UNPACKAGED_NAME.to_string(),
            Rc::new(Package::unpackaged()),
        );
        let mut transport_units = HashMap::new();
        transport_units.insert(
            TransportUnit::UNRESTRICTED_NAME.to_string(),
            Rc::new(TransportUnit::unrestricted()),
        );
        Self {
            time: 0,
            rng: RngManager::new(seed),
            traders: BTreeSet::new(),
            packages,
            transport_units,
            events: EventLog::new(),
        }
    }

    /// Convenience constructor for a shared handle
    pub fn handle(seed: u64) -> ContextHandle {
        Rc::new(RefCell::new(Self::new(seed)))
    }

    /// Current simulated time step
    pub fn time(&self) -> i64 {
        self.time
    }

    /// Advance the clock by one step
    pub fn advance_time(&mut self) {
        self.time += 1;
    }

    /// The run's deterministic RNG stream
    pub fn rng(&mut self) -> &mut RngManager {
        &mut self.rng
    }

    // ------------------------------------------------------------------
    // Trader registration
    // ------------------------------------------------------------------

    pub fn register_trader(&mut self, agent_id: &str, policy_name: &str) {
        self.traders
            .insert((agent_id.to_string(), policy_name.to_string()));
    }

    pub fn unregister_trader(&mut self, agent_id: &str, policy_name: &str) {
        self.traders
            .remove(&(agent_id.to_string(), policy_name.to_string()));
    }

    pub fn is_registered(&self, agent_id: &str, policy_name: &str) -> bool {
        self.traders
            .contains(&(agent_id.to_string(), policy_name.to_string()))
    }

    pub fn trader_count(&self) -> usize {
        self.traders.len()
    }

    // ------------------------------------------------------------------
    // Packaging registries
    // ------------------------------------------------------------------

    pub fn add_package(&mut self, package: Package) {
        self.packages
            .insert(package.name().to_string(), Rc::new(package));
    }

    pub fn get_package(&self, name: &str) -> Option<Rc<Package>> {
        self.packages.get(name).cloned()
    }

    pub fn add_transport_unit(&mut self, unit: TransportUnit) {
        self.transport_units
            .insert(unit.name().to_string(), Rc::new(unit));
    }

    pub fn get_transport_unit(&self, name: &str) -> Option<Rc<TransportUnit>> {
        self.transport_units.get(name).cloned()
    }

    // ------------------------------------------------------------------
    // Event recording
    // ------------------------------------------------------------------

    /// Record a cycle-window event for the external recorder
    pub fn record_cycle_window(
        &mut self,
        time: i64,
        agent_id: &str,
        policy: &str,
        window: WindowKind,
        length: i64,
    ) {
        self.events.log(Event::CycleWindow {
            time,
            agent_id: agent_id.to_string(),
            policy: policy.to_string(),
            window,
            length,
        });
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }
}
