//! Transport-unit policy: how many packages may move together.
//!
//! A transport unit carries package-count fill bounds and a load
//! strategy. `max_shippable_packages` reports how many of `n` offered
//! packages can actually move, building loads greedily; callers drop the
//! trailing excess.

use serde::{Deserialize, Serialize};

use super::package::PackagingError;

/// Per-load package-count strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadStrategy {
    /// Fill each transport unit to fill_max, first to last
    First,
    /// Spread packages into equally-sized loads within the bounds
    Equal,
}

impl LoadStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadStrategy::First => "first",
            LoadStrategy::Equal => "equal",
        }
    }
}

/// Transport-unit policy object.
///
/// # Example
/// ```
/// use resource_exchange_core_rs::packaging::{LoadStrategy, TransportUnit};
///
/// let tu = TransportUnit::new("truck", 2, 3, LoadStrategy::First).unwrap();
/// // 7 packages: loads of 3 and 3, the leftover 1 cannot form a load
/// assert_eq!(tu.max_shippable_packages(7), 6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportUnit {
    name: String,
    fill_min: usize,
    fill_max: usize,
    strategy: LoadStrategy,
}

impl TransportUnit {
    /// Name of the unrestricted sentinel
    pub const UNRESTRICTED_NAME: &'static str = "unrestricted";

    pub fn new(
        name: &str,
        fill_min: usize,
        fill_max: usize,
        strategy: LoadStrategy,
    ) -> Result<Self, PackagingError> {
        if fill_max == 0 || fill_min > fill_max {
            return Err(PackagingError::InvalidBounds {
                name: name.to_string(),
                fill_min: fill_min as f64,
                fill_max: fill_max as f64,
            });
        }
        Ok(Self {
            name: name.to_string(),
            fill_min,
            fill_max,
            strategy,
        })
    }

    /// The sentinel transport unit: every package count is shippable
    pub fn unrestricted() -> Self {
        Self {
            name: Self::UNRESTRICTED_NAME.to_string(),
            fill_min: 0,
            fill_max: usize::MAX,
            strategy: LoadStrategy::First,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fill_min(&self) -> usize {
        self.fill_min
    }

    pub fn fill_max(&self) -> usize {
        self.fill_max
    }

    pub fn strategy(&self) -> LoadStrategy {
        self.strategy
    }

    pub fn is_unrestricted(&self) -> bool {
        self.name == Self::UNRESTRICTED_NAME
    }

    /// Largest number of the `pkgs` offered packages that can be shipped,
    /// counted over as many loads as needed.
    pub fn max_shippable_packages(&self, pkgs: usize) -> usize {
        if self.is_unrestricted() {
            return pkgs;
        }
        if pkgs == 0 || pkgs < self.fill_min {
            return 0;
        }

        let mut shippable = 0;
        let mut remaining = pkgs;
        while remaining >= self.fill_min && remaining > 0 {
            let load = self.load_size(remaining);
            if load == 0 {
                break;
            }
            shippable += load;
            remaining -= load;
        }
        shippable
    }

    /// Package count for the next load out of `remaining`
    fn load_size(&self, remaining: usize) -> usize {
        match self.strategy {
            LoadStrategy::First => remaining.min(self.fill_max),
            LoadStrategy::Equal => {
                let num_loads = remaining.div_ceil(self.fill_max);
                remaining.div_ceil(num_loads).min(self.fill_max)
            }
        }
    }
}
