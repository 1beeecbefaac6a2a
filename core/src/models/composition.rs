//! Opaque material composition.
//!
//! The trading core never computes physics on a composition; it only
//! matches compositions between requests and offers and substitutes one
//! for another on settlement. A composition is a normalized map of
//! nuclide id → mass fraction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Nuclide identifier (ZZAAAMMMM convention, e.g. 10010000 for H-1)
pub type Nuclide = u32;

/// Normalized mass-fraction composition.
///
/// # Example
/// ```
/// use resource_exchange_core_rs::models::Composition;
///
/// let comp = Composition::from_mass([(922350000, 4.0), (922380000, 96.0)]);
/// let fractions = comp.mass_fractions();
/// assert!((fractions[&922350000] - 0.04).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    fractions: BTreeMap<Nuclide, f64>,
}

impl Composition {
    /// Build from (nuclide, mass) pairs; masses are normalized to fractions.
    /// Non-positive entries are dropped. An all-zero input yields an empty
    /// composition.
    pub fn from_mass<I>(masses: I) -> Self
    where
        I: IntoIterator<Item = (Nuclide, f64)>,
    {
        let mut fractions: BTreeMap<Nuclide, f64> =
            masses.into_iter().filter(|(_, m)| *m > 0.0).collect();
        let total: f64 = fractions.values().sum();
        if total > 0.0 {
            for v in fractions.values_mut() {
                *v /= total;
            }
        }
        Self { fractions }
    }

    /// Placeholder composition used when a requester does not care about
    /// the material it receives (trace hydrogen).
    pub fn trace() -> Self {
        Self::from_mass([(10010000, 1e-100)])
    }

    /// Normalized mass fractions
    pub fn mass_fractions(&self) -> &BTreeMap<Nuclide, f64> {
        &self.fractions
    }

    pub fn is_empty(&self) -> bool {
        self.fractions.is_empty()
    }

    /// Compare mass profiles within a per-nuclide tolerance.
    ///
    /// Used on settlement to decide whether substituting the requested
    /// composition for the inventory's is a no-op physically.
    pub fn almost_eq(&self, other: &Composition, tolerance: f64) -> bool {
        let keys: std::collections::BTreeSet<&Nuclide> = self
            .fractions
            .keys()
            .chain(other.fractions.keys())
            .collect();
        keys.into_iter().all(|k| {
            let a = self.fractions.get(k).copied().unwrap_or(0.0);
            let b = other.fractions.get(k).copied().unwrap_or(0.0);
            (a - b).abs() <= tolerance
        })
    }

    /// Mass-weighted blend of two compositions (inventory pop combining
    /// adjacent units).
    pub fn blend(&self, self_mass: f64, other: &Composition, other_mass: f64) -> Composition {
        let total = self_mass + other_mass;
        if total <= 0.0 {
            return self.clone();
        }
        let mut combined: BTreeMap<Nuclide, f64> = BTreeMap::new();
        for (k, frac) in &self.fractions {
            *combined.entry(*k).or_insert(0.0) += frac * self_mass;
        }
        for (k, frac) in &other.fractions {
            *combined.entry(*k).or_insert(0.0) += frac * other_mass;
        }
        Composition::from_mass(combined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mass_normalizes() {
        let comp = Composition::from_mass([(1, 2.0), (2, 2.0)]);
        assert!((comp.mass_fractions()[&1] - 0.5).abs() < 1e-12);
        assert!((comp.mass_fractions()[&2] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_almost_eq_tolerance() {
        let a = Composition::from_mass([(1, 0.50), (2, 0.50)]);
        let b = Composition::from_mass([(1, 0.501), (2, 0.499)]);
        assert!(a.almost_eq(&b, 1e-2));
        assert!(!a.almost_eq(&b, 1e-5));
    }

    #[test]
    fn test_almost_eq_disjoint_nuclides() {
        let a = Composition::from_mass([(1, 1.0)]);
        let b = Composition::from_mass([(2, 1.0)]);
        assert!(!a.almost_eq(&b, 1e-6));
    }

    #[test]
    fn test_blend_weighted() {
        let a = Composition::from_mass([(1, 1.0)]);
        let b = Composition::from_mass([(2, 1.0)]);
        let mix = a.blend(3.0, &b, 1.0);
        assert!((mix.mass_fractions()[&1] - 0.75).abs() < 1e-12);
        assert!((mix.mass_fractions()[&2] - 0.25).abs() < 1e-12);
    }
}
