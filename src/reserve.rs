//! The idle reserve: a bounded cache of open, currently unused resources

use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::queue::ArrayQueue;

use crate::admission::Ticket;
use crate::errors::{PoolError, PoolResult};

/// An open resource parked in the reserve, paired with the ticket that
/// admitted it.
pub(crate) struct Parked<T> {
    pub(crate) resource: T,
    pub(crate) ticket: Ticket,
}

/// Bounded non-blocking cache of idle resources.
///
/// No validation happens on insert; takers test the resource themselves
/// before trusting it. A capacity of zero disables caching: every take
/// misses and every put reports the reserve full.
pub(crate) struct Reserve<T> {
    // None when the configured reserve size is zero; ArrayQueue rejects
    // zero capacity.
    slots: Option<ArrayQueue<Parked<T>>>,
    closed: AtomicBool,
}

impl<T> Reserve<T> {
    pub(crate) fn new(cap: usize) -> Self {
        let slots = if cap == 0 {
            None
        } else {
            Some(ArrayQueue::new(cap))
        };
        Self {
            slots,
            closed: AtomicBool::new(false),
        }
    }

    /// Take an idle resource if one exists. `Ok(None)` means the reserve is
    /// simply empty right now; nothing is created from here.
    pub(crate) fn try_take(&self) -> PoolResult<Option<Parked<T>>> {
        if self.closed.load(Ordering::Acquire) {
            return Err(PoolError::Closed);
        }
        Ok(self.slots.as_ref().and_then(|queue| queue.pop()))
    }

    /// Park an idle resource. On a full or closed reserve the pair comes
    /// back to the caller, which must close the resource and return its
    /// ticket.
    pub(crate) fn try_put(&self, parked: Parked<T>) -> Result<(), Parked<T>> {
        if self.closed.load(Ordering::Acquire) {
            return Err(parked);
        }
        match &self.slots {
            Some(queue) => queue.push(parked),
            None => Err(parked),
        }
    }

    /// Refuse further traffic and hand back whatever was idle so the pool
    /// can close each resource.
    pub(crate) fn close(&self) -> Vec<Parked<T>> {
        self.closed.store(true, Ordering::Release);
        let mut drained = Vec::new();
        if let Some(queue) = &self.slots {
            while let Some(parked) = queue.pop() {
                drained.push(parked);
            }
        }
        drained
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.as_ref().map_or(0, |queue| queue.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission::Tickets;

    fn ticket() -> Ticket {
        Tickets::new(1).try_acquire().unwrap()
    }

    #[test]
    fn take_from_empty_reserve_is_a_miss() {
        let reserve: Reserve<u8> = Reserve::new(2);
        assert!(reserve.try_take().unwrap().is_none());
        assert_eq!(reserve.len(), 0);
    }

    #[test]
    fn put_then_take_roundtrips() {
        let reserve = Reserve::new(1);
        assert!(
            reserve
                .try_put(Parked {
                    resource: 7u8,
                    ticket: ticket(),
                })
                .is_ok()
        );
        assert_eq!(reserve.len(), 1);

        // A second put overflows and hands the pair back.
        assert!(
            reserve
                .try_put(Parked {
                    resource: 8u8,
                    ticket: ticket(),
                })
                .is_err()
        );

        let parked = reserve.try_take().unwrap().unwrap();
        assert_eq!(parked.resource, 7);
    }

    #[test]
    fn zero_capacity_never_caches() {
        let reserve = Reserve::new(0);
        assert!(reserve.try_take().unwrap().is_none());
        assert!(
            reserve
                .try_put(Parked {
                    resource: 1u8,
                    ticket: ticket(),
                })
                .is_err()
        );
    }

    #[test]
    fn close_drains_and_rejects() {
        let reserve = Reserve::new(2);
        assert!(
            reserve
                .try_put(Parked {
                    resource: 1u8,
                    ticket: ticket(),
                })
                .is_ok()
        );

        let drained = reserve.close();
        assert_eq!(drained.len(), 1);
        assert!(matches!(reserve.try_take(), Err(PoolError::Closed)));
        assert!(
            reserve
                .try_put(Parked {
                    resource: 2u8,
                    ticket: ticket(),
                })
                .is_err()
        );
    }
}
