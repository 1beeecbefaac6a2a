//! Domain models: compositions, resources, buffers, trackers, events.

pub mod buffer;
pub mod composition;
pub mod event;
pub mod resource;
pub mod tracker;

pub use buffer::{BufferError, BufferHandle, ResourceBuffer};
pub use composition::{Composition, Nuclide};
pub use event::{Event, EventLog, WindowKind};
pub use resource::Resource;
pub use tracker::{TotalInvTracker, TrackerError};
