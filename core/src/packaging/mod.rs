//! Packaging and shipping constraints shared by the sell policy.

mod package;
mod transport;

pub use package::{FillStrategy, Package, PackagingError};
pub use transport::{LoadStrategy, TransportUnit};
