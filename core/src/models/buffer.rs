//! Inventory buffer: an ordered collection of resource units with a
//! fixed mass capacity.
//!
//! Policies reference a buffer through a shared handle; they push
//! settled deliveries in and pop offered mass out, in FIFO order. The
//! buffer never reorders its contents.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Resource;

/// Shared single-threaded handle to a buffer (owned by the managing
/// agent, referenced by its policies).
pub type BufferHandle = Rc<RefCell<ResourceBuffer>>;

/// Errors that can occur during buffer operations
#[derive(Debug, Error, PartialEq)]
pub enum BufferError {
    #[error("push of {pushed} kg exceeds remaining space {space} kg")]
    OverCapacity { pushed: f64, space: f64 },

    #[error("pop of {requested} kg exceeds held quantity {available} kg")]
    Insufficient { requested: f64, available: f64 },
}

/// FIFO resource buffer with fixed capacity.
///
/// # Example
/// ```
/// use resource_exchange_core_rs::models::{Composition, Resource, ResourceBuffer};
///
/// let mut buf = ResourceBuffer::new(100.0);
/// buf.push(Resource::new(40.0, Composition::trace())).unwrap();
/// assert_eq!(buf.quantity(), 40.0);
/// assert_eq!(buf.space(), 60.0);
///
/// let popped = buf.pop(15.0, 1e-6).unwrap();
/// assert_eq!(popped.quantity(), 15.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceBuffer {
    units: VecDeque<Resource>,
    capacity: f64,
}

impl ResourceBuffer {
    /// Create an empty buffer with the given mass capacity
    pub fn new(capacity: f64) -> Self {
        assert!(capacity > 0.0, "capacity must be positive");
        Self {
            units: VecDeque::new(),
            capacity,
        }
    }

    /// Convenience constructor for a shared handle
    pub fn handle(capacity: f64) -> BufferHandle {
        Rc::new(RefCell::new(Self::new(capacity)))
    }

    /// Total held mass
    pub fn quantity(&self) -> f64 {
        self.units.iter().map(Resource::quantity).sum()
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Remaining mass space
    pub fn space(&self) -> f64 {
        (self.capacity - self.quantity()).max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Number of discrete units held
    pub fn count(&self) -> usize {
        self.units.len()
    }

    /// Look at the oldest unit without removing it
    pub fn peek(&self) -> Option<&Resource> {
        self.units.front()
    }

    /// Append a unit. Fails without mutating when the unit does not fit.
    pub fn push(&mut self, resource: Resource) -> Result<(), BufferError> {
        let space = self.space();
        if resource.quantity() > space + crate::EPS_RSRC {
            return Err(BufferError::OverCapacity {
                pushed: resource.quantity(),
                space,
            });
        }
        self.units.push_back(resource);
        Ok(())
    }

    /// Remove `amount` kg from the front of the buffer as one combined
    /// unit. The unit straddling the boundary is split; compositions of
    /// combined units are blended by mass. `tolerance` absorbs floating
    /// point slack in the requested amount.
    pub fn pop(&mut self, amount: f64, tolerance: f64) -> Result<Resource, BufferError> {
        let available = self.quantity();
        if amount > available + tolerance {
            return Err(BufferError::Insufficient {
                requested: amount,
                available,
            });
        }

        let mut popped: Option<Resource> = None;
        let mut remaining = amount.min(available);
        while remaining > tolerance {
            // quantity check above guarantees a front unit exists
            let mut front = self.units.pop_front().expect("buffer accounting broken");
            if front.quantity() > remaining + tolerance {
                let taken = front.split(remaining);
                self.units.push_front(front);
                remaining = 0.0;
                match popped.as_mut() {
                    Some(acc) => acc.absorb(taken),
                    None => popped = Some(taken),
                }
            } else {
                remaining -= front.quantity();
                match popped.as_mut() {
                    Some(acc) => acc.absorb(front),
                    None => popped = Some(front),
                }
            }
        }

        Ok(popped.unwrap_or_else(|| Resource::empty(crate::models::Composition::trace())))
    }
}
