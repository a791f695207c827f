//! Protocol faults seen by the completion handoff
//!
//! A notification that arrives when nobody armed the handoff is never
//! delivered to a waiter. It is kept here instead so the outcome is not
//! lost without a trace.

use heapless::Deque;

use super::outcome::Outcome;

/// Number of faults retained; older entries are overwritten
pub const FAULT_LOG_DEPTH: usize = 8;

/// A notification that could not be delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// Notified while idle (spurious interrupt, or a late completion
    /// after the previous outcome was already consumed)
    Unarmed(Outcome),
    /// Notified again before the first outcome was consumed
    Duplicate(Outcome),
    /// Completion lost the race against `cancel()`
    AfterCancel(Outcome),
}

impl Fault {
    /// The outcome carried by the dropped notification
    pub fn outcome(&self) -> Outcome {
        match *self {
            Fault::Unarmed(o) | Fault::Duplicate(o) | Fault::AfterCancel(o) => o,
        }
    }
}

/// Bounded fault history plus a running total
#[derive(Debug)]
pub(crate) struct FaultLog {
    recent: Deque<Fault, FAULT_LOG_DEPTH>,
    total: u32,
}

impl FaultLog {
    pub(crate) const fn new() -> Self {
        Self {
            recent: Deque::new(),
            total: 0,
        }
    }

    /// Record a fault, evicting the oldest entry when full. O(1).
    pub(crate) fn record(&mut self, fault: Fault) {
        if self.recent.is_full() {
            self.recent.pop_front();
        }
        // Cannot fail: a slot was freed above
        let _ = self.recent.push_back(fault);
        self.total = self.total.saturating_add(1);
    }

    pub(crate) fn take(&mut self) -> Option<Fault> {
        self.recent.pop_front()
    }

    pub(crate) fn total(&self) -> u32 {
        self.total
    }
}
