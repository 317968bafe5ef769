//! Admission control: the ticket semaphore bounding open resources

use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::queue::ArrayQueue;

use crate::errors::{PoolError, PoolResult};

/// Permit to hold one open resource. Handed out by
/// [`Tickets::try_acquire`] and surrendered back exactly once, when the
/// resource it admitted is parked forever or closed.
#[derive(Debug)]
pub(crate) struct Ticket(());

/// Counting semaphore pre-loaded with one permit per allowed open resource.
///
/// This is a capacity ceiling, not a work queue: acquisition never blocks
/// and no ordering is guaranteed among contending callers.
pub(crate) struct Tickets {
    slots: ArrayQueue<Ticket>,
    closed: AtomicBool,
}

impl Tickets {
    pub(crate) fn new(cap: usize) -> Self {
        let slots = ArrayQueue::new(cap);
        for _ in 0..cap {
            let _ = slots.push(Ticket(()));
        }
        Self {
            slots,
            closed: AtomicBool::new(false),
        }
    }

    /// Non-blocking acquisition attempt.
    pub(crate) fn try_acquire(&self) -> PoolResult<Ticket> {
        if self.closed.load(Ordering::Acquire) {
            return Err(PoolError::Closed);
        }
        self.slots.pop().ok_or(PoolError::Exhausted)
    }

    /// Give a permit back. After shutdown the permit is silently dropped.
    pub(crate) fn release(&self, ticket: Ticket) {
        if !self.closed.load(Ordering::Acquire) {
            let _ = self.slots.push(ticket);
        }
    }

    /// Refuse future acquisitions and discard every free permit.
    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::Release);
        while self.slots.pop().is_some() {}
    }

    /// Permits currently free, i.e. capacity minus open resources.
    pub(crate) fn free(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }
}
