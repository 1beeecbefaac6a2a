//! Packaging policy: how a continuous mass is split into discrete
//! shippable units.
//!
//! A package carries fill bounds [fill_min, fill_max] (kg per unit) and
//! a fill strategy deciding the per-unit mass. The "unpackaged" sentinel
//! accepts any mass as a single unit.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rng::RngManager;

/// Errors raised when constructing a package or transport unit
#[derive(Debug, Error, PartialEq)]
pub enum PackagingError {
    #[error("invalid fill bounds [{fill_min}, {fill_max}] for '{name}'")]
    InvalidBounds {
        name: String,
        fill_min: f64,
        fill_max: f64,
    },
}

/// Per-unit fill-mass strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillStrategy {
    /// Fill each unit to fill_max, first to last
    First,
    /// Spread the mass into equal units within the bounds
    Equal,
    /// Sample one fill mass uniformly in [fill_min, fill_max]
    Uniform,
    /// Sample one fill mass from a truncated normal centered in the bounds
    Normal,
}

impl FillStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FillStrategy::First => "first",
            FillStrategy::Equal => "equal",
            FillStrategy::Uniform => "uniform",
            FillStrategy::Normal => "normal",
        }
    }

    /// Strategies whose fill mass is deterministic for a given quantity
    pub fn is_deterministic(&self) -> bool {
        matches!(self, FillStrategy::First | FillStrategy::Equal)
    }
}

/// Packaging policy object.
///
/// # Example
/// ```
/// use resource_exchange_core_rs::packaging::{FillStrategy, Package};
/// use resource_exchange_core_rs::rng::RngManager;
///
/// let pkg = Package::new("cask", 5.0, 20.0, FillStrategy::First).unwrap();
/// let mut rng = RngManager::new(1);
/// assert_eq!(pkg.fill_mass(50.0, &mut rng), vec![20.0, 20.0, 10.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    name: String,
    fill_min: f64,
    fill_max: f64,
    strategy: FillStrategy,
}

impl Package {
    /// Name of the unpackaged sentinel
    pub const UNPACKAGED_NAME: &'static str = "unpackaged";

    pub fn new(
        name: &str,
        fill_min: f64,
        fill_max: f64,
        strategy: FillStrategy,
    ) -> Result<Self, PackagingError> {
        if fill_min < 0.0 || fill_max <= 0.0 || fill_min > fill_max {
            return Err(PackagingError::InvalidBounds {
                name: name.to_string(),
                fill_min,
                fill_max,
            });
        }
        Ok(Self {
            name: name.to_string(),
            fill_min,
            fill_max,
            strategy,
        })
    }

    /// The sentinel package: no bounds, any mass moves as one unit
    pub fn unpackaged() -> Self {
        Self {
            name: Self::UNPACKAGED_NAME.to_string(),
            fill_min: 0.0,
            fill_max: f64::MAX,
            strategy: FillStrategy::First,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fill_min(&self) -> f64 {
        self.fill_min
    }

    pub fn fill_max(&self) -> f64 {
        self.fill_max
    }

    pub fn strategy(&self) -> FillStrategy {
        self.strategy
    }

    pub fn is_unpackaged(&self) -> bool {
        self.name == Self::UNPACKAGED_NAME
    }

    /// Split `qty` into an ordered list of per-unit fill masses.
    ///
    /// Returns an empty list when `qty` cannot fill even one unit. A
    /// trailing partial unit is kept only when it reaches fill_min.
    /// Uniform/Normal strategies draw the fill mass from the injected
    /// stream.
    pub fn fill_mass(&self, qty: f64, rng: &mut RngManager) -> Vec<f64> {
        if qty <= 0.0 || qty < self.fill_min {
            return Vec::new();
        }
        if self.is_unpackaged() {
            return vec![qty];
        }

        let fill = match self.strategy {
            FillStrategy::First => self.fill_max,
            FillStrategy::Equal => {
                let num_max = (qty / self.fill_max).ceil();
                if self.fill_min > 0.0 {
                    let num_min = (qty / self.fill_min).floor();
                    if num_min >= num_max {
                        qty / num_max
                    } else {
                        self.fill_max
                    }
                } else {
                    qty / num_max
                }
            }
            FillStrategy::Uniform => rng.range_f64(self.fill_min, self.fill_max),
            FillStrategy::Normal => {
                let mean = (self.fill_min + self.fill_max) / 2.0;
                let std_dev = (self.fill_max - self.fill_min) / 6.0;
                rng.normal(mean, std_dev)
                    .clamp(self.fill_min, self.fill_max)
            }
        };

        let num_full = (qty / fill).floor() as usize;
        let mut masses = vec![fill; num_full];
        let remainder = qty - fill * num_full as f64;
        if remainder > crate::EPS_RSRC && remainder >= self.fill_min {
            masses.push(remainder);
        }
        masses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpackaged_single_unit() {
        let pkg = Package::unpackaged();
        let mut rng = RngManager::new(1);
        assert_eq!(pkg.fill_mass(37.5, &mut rng), vec![37.5]);
    }

    #[test]
    fn test_first_strategy_truncates_tail() {
        let pkg = Package::new("drum", 1.0, 4.0, FillStrategy::First).unwrap();
        let mut rng = RngManager::new(1);
        assert_eq!(pkg.fill_mass(10.0, &mut rng), vec![4.0, 4.0, 2.0]);
    }

    #[test]
    fn test_tail_below_fill_min_dropped() {
        let pkg = Package::new("drum", 3.0, 4.0, FillStrategy::First).unwrap();
        let mut rng = RngManager::new(1);
        // remainder of 2 kg is under fill_min and is not a unit
        assert_eq!(pkg.fill_mass(10.0, &mut rng), vec![4.0, 4.0]);
    }

    #[test]
    fn test_equal_strategy_spreads_mass() {
        let pkg = Package::new("drum", 3.0, 4.0, FillStrategy::Equal).unwrap();
        let mut rng = RngManager::new(1);
        let masses = pkg.fill_mass(10.0, &mut rng);
        // three units of 10/3 rather than 4+4+(dropped 2)
        assert_eq!(masses.len(), 3);
        for m in &masses {
            assert!((m - 10.0 / 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_below_fill_min_yields_nothing() {
        let pkg = Package::new("drum", 5.0, 10.0, FillStrategy::First).unwrap();
        let mut rng = RngManager::new(1);
        assert!(pkg.fill_mass(4.0, &mut rng).is_empty());
    }

    #[test]
    fn test_uniform_fill_within_bounds() {
        let pkg = Package::new("drum", 2.0, 4.0, FillStrategy::Uniform).unwrap();
        let mut rng = RngManager::new(9);
        for mass in pkg.fill_mass(20.0, &mut rng) {
            assert!(mass >= 2.0 - 1e-9 && mass <= 4.0 + 1e-9);
        }
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        assert!(Package::new("bad", 5.0, 2.0, FillStrategy::First).is_err());
        assert!(Package::new("bad", -1.0, 2.0, FillStrategy::First).is_err());
    }
}
