//! Cross-buffer inventory accounting.
//!
//! A buy policy may share a total-inventory cap across several buffers
//! owned by the same agent. The tracker references the buffers and
//! reports combined quantity and remaining space against its own
//! capacity.

use std::rc::Rc;

use thiserror::Error;

use crate::models::buffer::BufferHandle;

/// Errors raised when configuring a tracker
#[derive(Debug, Error, PartialEq)]
pub enum TrackerError {
    #[error("tracker requires at least one buffer")]
    NoBuffers,

    #[error("tracker capacity must be positive, got {0}")]
    NonPositiveCapacity(f64),
}

/// Total inventory tracker over one or more buffers.
///
/// # Example
/// ```
/// use resource_exchange_core_rs::models::{ResourceBuffer, TotalInvTracker};
///
/// let buf = ResourceBuffer::handle(100.0);
/// let tracker = TotalInvTracker::init(vec![buf.clone()], 100.0).unwrap();
/// assert!(tracker.contains(&buf));
/// assert_eq!(tracker.space(), 100.0);
/// ```
#[derive(Debug, Clone)]
pub struct TotalInvTracker {
    bufs: Vec<BufferHandle>,
    capacity: f64,
}

impl TotalInvTracker {
    /// Build a tracker over the given buffers with a shared capacity
    pub fn init(bufs: Vec<BufferHandle>, capacity: f64) -> Result<Self, TrackerError> {
        if bufs.is_empty() {
            return Err(TrackerError::NoBuffers);
        }
        if capacity <= 0.0 {
            return Err(TrackerError::NonPositiveCapacity(capacity));
        }
        Ok(Self { bufs, capacity })
    }

    /// Tracker over a single buffer, capped at that buffer's capacity
    pub fn single(buf: BufferHandle) -> Self {
        let capacity = buf.borrow().capacity();
        Self {
            bufs: vec![buf],
            capacity,
        }
    }

    /// Whether the given buffer is one of the tracked handles
    pub fn contains(&self, buf: &BufferHandle) -> bool {
        self.bufs.iter().any(|b| Rc::ptr_eq(b, buf))
    }

    /// Combined held mass across tracked buffers
    pub fn quantity(&self) -> f64 {
        self.bufs.iter().map(|b| b.borrow().quantity()).sum()
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Remaining space against the tracker capacity
    pub fn space(&self) -> f64 {
        (self.capacity - self.quantity()).max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.quantity() < crate::EPS_RSRC
    }
}
