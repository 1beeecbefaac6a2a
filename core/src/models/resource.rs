//! Resource unit: a mass of material with a composition and a packaging
//! identity.
//!
//! Resources are what buy policies request, sell policies offer, and
//! buffers store. The trading core moves them around and repackages them
//! but never computes on their composition beyond matching.

use serde::{Deserialize, Serialize};

use crate::models::Composition;
use crate::packaging::Package;
use crate::rng::RngManager;

/// A discrete quantity of material (kg).
///
/// # Example
/// ```
/// use resource_exchange_core_rs::models::{Composition, Resource};
///
/// let mut r = Resource::new(10.0, Composition::trace());
/// let half = r.split(5.0);
/// assert_eq!(r.quantity(), 5.0);
/// assert_eq!(half.quantity(), 5.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    quantity: f64,
    comp: Composition,
    package_name: String,
}

impl Resource {
    /// Create an unpackaged resource
    pub fn new(quantity: f64, comp: Composition) -> Self {
        assert!(quantity >= 0.0, "quantity must be non-negative");
        Self {
            quantity,
            comp,
            package_name: Package::UNPACKAGED_NAME.to_string(),
        }
    }

    /// Zero-quantity resource with the given composition. Shipped when
    /// packaging a trade yields no usable unit.
    pub fn empty(comp: Composition) -> Self {
        Self::new(0.0, comp)
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn comp(&self) -> &Composition {
        &self.comp
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Replace the composition without touching the mass (settlement-side
    /// substitution when profiles already match within tolerance).
    pub fn transmute(&mut self, comp: Composition) {
        self.comp = comp;
    }

    /// Take `qty` out of this resource, returning it as a new unit with
    /// the same composition and packaging. Clamped to the available mass.
    pub fn split(&mut self, qty: f64) -> Resource {
        let taken = qty.min(self.quantity).max(0.0);
        self.quantity -= taken;
        Resource {
            quantity: taken,
            comp: self.comp.clone(),
            package_name: self.package_name.clone(),
        }
    }

    /// Merge another unit into this one, blending compositions by mass.
    /// The combined unit keeps this resource's packaging identity.
    pub fn absorb(&mut self, other: Resource) {
        self.comp = self
            .comp
            .blend(self.quantity, other.comp(), other.quantity());
        self.quantity += other.quantity;
    }

    /// Repackage as much of this resource as possible into `pkg`-sized
    /// units, in fill order. Packaged mass leaves `self`; whatever the
    /// fill strategy cannot place stays behind as unpackaged remainder.
    pub fn package_into(&mut self, pkg: &Package, rng: &mut RngManager) -> Vec<Resource> {
        let fills = pkg.fill_mass(self.quantity, rng);
        fills
            .into_iter()
            .map(|mass| {
                let mut unit = self.split(mass);
                unit.package_name = pkg.name().to_string();
                unit
            })
            .collect()
    }
}
