//! Single-slot completion handoff
//!
//! The handoff moves through a small, explicit state machine:
//!
//! ```text
//!          arm()             notify()            wait() consumes
//!   Idle ────────▶ Armed ──────────────▶ Completed ─────────────▶ Idle
//!    ▲               │
//!    │   wait()      │ cancel()
//!    └─ consumes ── Cancelled ──── arm() ───▶ Armed
//! ```
//!
//! All state sits behind a critical-section mutex, which gives the
//! release (notify) / acquire (wait) ordering the outcome needs and is
//! safe to take from an interrupt handler. Only the waker lives outside
//! of it, in an [`AtomicWaker`].

use core::cell::RefCell;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::waitqueue::AtomicWaker;
use embassy_time::{with_timeout, Duration};

use super::fault::{Fault, FaultLog};
use super::outcome::Outcome;

/// Where the handoff is in its arm/notify/consume cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Nothing outstanding
    Idle,
    /// Armed for the next transfer, outcome not yet posted
    Armed,
    /// Outcome posted, waiting to be consumed
    Completed(Outcome),
    /// Armed cycle was cancelled before the outcome arrived
    Cancelled,
}

/// Misuse of the handoff, or a wait that ended without an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncError {
    /// `arm()` while a cycle is still outstanding
    AlreadyArmed,
    /// `wait()` with nothing armed
    NotArmed,
    /// Another task is already waiting
    WaiterBusy,
    /// The cycle was cancelled
    Cancelled,
    /// No outcome arrived before the deadline
    Timeout,
}

/// Result of racing `cancel()` against `notify()`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Cancel {
    /// Cancel won; any later notification is discarded
    Cancelled,
    /// Notify won; the outcome stands and is still waiting to be consumed
    TooLate(Outcome),
    /// Nothing was armed
    Idle,
}

struct Slot {
    phase: Phase,
    waiting: bool,
    faults: FaultLog,
}

/// Single-slot completion handoff
///
/// `notify` is the only operation meant for interrupt context: it never
/// blocks, never allocates and only holds a critical section for a few
/// instructions. `wait` is the only operation that suspends.
pub struct Completion {
    slot: Mutex<CriticalSectionRawMutex, RefCell<Slot>>,
    waker: AtomicWaker,
}

impl Default for Completion {
    fn default() -> Self {
        Self::new()
    }
}

impl Completion {
    /// Create an idle handoff
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(RefCell::new(Slot {
                phase: Phase::Idle,
                waiting: false,
                faults: FaultLog::new(),
            })),
            waker: AtomicWaker::new(),
        }
    }

    fn with_slot<R>(&self, f: impl FnOnce(&mut Slot) -> R) -> R {
        self.slot.lock(|slot| f(&mut slot.borrow_mut()))
    }

    /// Arm for the next transfer
    ///
    /// Must happen before the transfer is started, never after, so the
    /// engine's notification cannot race ahead of it.
    pub fn arm(&self) -> Result<(), SyncError> {
        self.with_slot(|slot| match slot.phase {
            Phase::Idle | Phase::Cancelled => {
                slot.phase = Phase::Armed;
                Ok(())
            }
            Phase::Armed | Phase::Completed(_) => Err(SyncError::AlreadyArmed),
        })
    }

    /// Post the terminal outcome of the armed transfer
    ///
    /// Callable from interrupt context. Returns `false` if the outcome was
    /// not delivered; in that case it is recorded as a [`Fault`].
    pub fn notify(&self, outcome: Outcome) -> bool {
        let delivered = self.with_slot(|slot| {
            let fault = match slot.phase {
                Phase::Armed => {
                    slot.phase = Phase::Completed(outcome);
                    return true;
                }
                Phase::Idle => Fault::Unarmed(outcome),
                Phase::Completed(_) => Fault::Duplicate(outcome),
                Phase::Cancelled => Fault::AfterCancel(outcome),
            };
            slot.faults.record(fault);
            #[cfg(feature = "defmt")]
            defmt::warn!("completion dropped: {}", fault);
            false
        });

        if delivered {
            self.waker.wake();
        }
        delivered
    }

    /// Cancel the armed cycle
    ///
    /// Safe to race with `notify()`: whichever takes the critical section
    /// first wins and the other one's effect is discarded.
    pub fn cancel(&self) -> Cancel {
        let result = self.with_slot(|slot| match slot.phase {
            Phase::Armed => {
                slot.phase = Phase::Cancelled;
                Cancel::Cancelled
            }
            Phase::Completed(outcome) => Cancel::TooLate(outcome),
            Phase::Idle | Phase::Cancelled => Cancel::Idle,
        });

        if result == Cancel::Cancelled {
            self.waker.wake();
        }
        result
    }

    /// Wait for the armed transfer's outcome
    ///
    /// Resolves immediately with `NotArmed` if nothing is armed, and with
    /// `WaiterBusy` if another task is already waiting. Consuming the
    /// outcome returns the handoff to [`Phase::Idle`].
    pub fn wait(&self) -> Wait<'_> {
        Wait {
            completion: self,
            claimed: false,
        }
    }

    /// Wait with a deadline
    ///
    /// On timeout the handoff stays armed: the engine may still complete,
    /// and the caller decides whether to `cancel()`.
    pub async fn wait_timeout(&self, timeout: Duration) -> Result<Outcome, SyncError> {
        match with_timeout(timeout, self.wait()).await {
            Ok(result) => result,
            Err(_) => Err(SyncError::Timeout),
        }
    }

    /// Wait forever when `timeout` is `None`, otherwise with a deadline
    pub async fn wait_for(&self, timeout: Option<Duration>) -> Result<Outcome, SyncError> {
        match timeout {
            Some(timeout) => self.wait_timeout(timeout).await,
            None => self.wait().await,
        }
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.with_slot(|slot| slot.phase)
    }

    /// Check if a transfer is armed and not yet completed
    pub fn is_armed(&self) -> bool {
        self.phase() == Phase::Armed
    }

    /// Pop the oldest recorded fault
    pub fn take_fault(&self) -> Option<Fault> {
        self.with_slot(|slot| slot.faults.take())
    }

    /// Number of faults recorded since creation
    pub fn fault_total(&self) -> u32 {
        self.with_slot(|slot| slot.faults.total())
    }
}

/// Future returned by [`Completion::wait`]
#[must_use = "futures do nothing unless awaited"]
pub struct Wait<'a> {
    completion: &'a Completion,
    claimed: bool,
}

impl Future for Wait<'_> {
    type Output = Result<Outcome, SyncError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let completion = this.completion;

        if !this.claimed {
            let claimed = completion.with_slot(|slot| {
                if slot.waiting {
                    false
                } else {
                    slot.waiting = true;
                    true
                }
            });
            if !claimed {
                return Poll::Ready(Err(SyncError::WaiterBusy));
            }
            this.claimed = true;
        }

        // Register before looking at the phase so a notify landing in
        // between still wakes us.
        completion.waker.register(cx.waker());

        let ready = completion.with_slot(|slot| {
            let result = match slot.phase {
                Phase::Armed => return None,
                Phase::Idle => Err(SyncError::NotArmed),
                Phase::Completed(outcome) => Ok(outcome),
                Phase::Cancelled => Err(SyncError::Cancelled),
            };
            slot.phase = Phase::Idle;
            slot.waiting = false;
            Some(result)
        });

        match ready {
            Some(result) => {
                this.claimed = false;
                Poll::Ready(result)
            }
            None => Poll::Pending,
        }
    }
}

impl Drop for Wait<'_> {
    fn drop(&mut self) {
        if self.claimed {
            self.completion.with_slot(|slot| slot.waiting = false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::leak_completion;
    use embassy_futures::block_on;
    use std::sync::mpsc;
    use std::thread;

    #[test]
    fn test_arm_notify_wait() {
        let completion = Completion::new();
        completion.arm().unwrap();
        assert!(completion.is_armed());

        assert!(completion.notify(Outcome::Success));
        assert_eq!(completion.phase(), Phase::Completed(Outcome::Success));

        assert_eq!(block_on(completion.wait()), Ok(Outcome::Success));
        assert_eq!(completion.phase(), Phase::Idle);
    }

    #[test]
    fn test_second_arm_before_consume_is_rejected() {
        let completion = Completion::new();
        completion.arm().unwrap();
        assert_eq!(completion.arm(), Err(SyncError::AlreadyArmed));

        completion.notify(Outcome::Success);
        assert_eq!(completion.arm(), Err(SyncError::AlreadyArmed));
    }

    #[test]
    fn test_wait_while_idle_is_rejected() {
        let completion = Completion::new();
        assert_eq!(block_on(completion.wait()), Err(SyncError::NotArmed));
    }

    #[test]
    fn test_second_notify_does_not_unblock_second_wait() {
        let completion = Completion::new();
        completion.arm().unwrap();

        assert!(completion.notify(Outcome::Success));
        assert!(!completion.notify(Outcome::error(2)));
        assert_eq!(block_on(completion.wait()), Ok(Outcome::Success));

        // Late notify after consumption is also dropped
        assert!(!completion.notify(Outcome::error(3)));
        assert_eq!(block_on(completion.wait()), Err(SyncError::NotArmed));

        assert_eq!(completion.fault_total(), 2);
        assert_eq!(
            completion.take_fault(),
            Some(Fault::Duplicate(Outcome::error(2)))
        );
        assert_eq!(
            completion.take_fault(),
            Some(Fault::Unarmed(Outcome::error(3)))
        );
        assert_eq!(completion.take_fault(), None);
    }

    #[test]
    fn test_unarmed_notify_is_logged_not_latched() {
        let completion = Completion::new();
        assert!(!completion.notify(Outcome::error(9)));
        assert_eq!(completion.phase(), Phase::Idle);

        // The stray outcome must not leak into the next cycle
        completion.arm().unwrap();
        assert!(completion.notify(Outcome::Success));
        assert_eq!(block_on(completion.wait()), Ok(Outcome::Success));
        assert_eq!(
            completion.take_fault(),
            Some(Fault::Unarmed(Outcome::error(9)))
        );
    }

    #[test]
    fn test_reset_after_consume_behaves_like_new() {
        let completion = Completion::new();
        for code in 0..4u16 {
            completion.arm().unwrap();
            assert_eq!(completion.phase(), Phase::Armed);
            completion.notify(Outcome::error(code));
            assert_eq!(block_on(completion.wait()), Ok(Outcome::error(code)));
            assert_eq!(completion.phase(), Phase::Idle);
        }
        assert_eq!(completion.fault_total(), 0);
    }

    #[test]
    fn test_cancel_wins_before_notify() {
        let completion = Completion::new();
        completion.arm().unwrap();

        assert_eq!(completion.cancel(), Cancel::Cancelled);
        assert!(!completion.notify(Outcome::Success));
        assert_eq!(block_on(completion.wait()), Err(SyncError::Cancelled));
        assert_eq!(
            completion.take_fault(),
            Some(Fault::AfterCancel(Outcome::Success))
        );

        // Cancelled cycles can be re-armed
        completion.arm().unwrap();
        assert_eq!(completion.phase(), Phase::Armed);
    }

    #[test]
    fn test_notify_wins_before_cancel() {
        let completion = Completion::new();
        completion.arm().unwrap();
        completion.notify(Outcome::error(4));

        assert_eq!(completion.cancel(), Cancel::TooLate(Outcome::error(4)));
        assert_eq!(block_on(completion.wait()), Ok(Outcome::error(4)));
        assert_eq!(completion.cancel(), Cancel::Idle);
    }

    #[test]
    fn test_wait_times_out_and_stays_armed() {
        let completion = Completion::new();
        completion.arm().unwrap();

        let result = block_on(completion.wait_timeout(Duration::from_millis(10)));
        assert_eq!(result, Err(SyncError::Timeout));
        assert!(completion.is_armed());

        // The dropped wait released the waiter slot
        completion.notify(Outcome::Success);
        assert_eq!(block_on(completion.wait()), Ok(Outcome::Success));
    }

    #[test]
    fn test_second_waiter_is_busy() {
        let completion = leak_completion();
        completion.arm().unwrap();

        let (started_tx, started_rx) = mpsc::channel();
        let waiter = thread::spawn(move || {
            let mut wait = core::pin::pin!(completion.wait());
            // First poll claims the waiter slot
            let mut cx = Context::from_waker(core::task::Waker::noop());
            assert!(wait.as_mut().poll(&mut cx).is_pending());
            started_tx.send(()).unwrap();
            block_on(wait)
        });

        started_rx.recv().unwrap();
        assert_eq!(block_on(completion.wait()), Err(SyncError::WaiterBusy));

        completion.notify(Outcome::Success);
        assert_eq!(waiter.join().unwrap(), Ok(Outcome::Success));
    }

    #[test]
    fn test_notify_from_other_context_wakes_waiter() {
        let completion = leak_completion();
        completion.arm().unwrap();

        let notifier = thread::spawn(move || {
            thread::sleep(std::time::Duration::from_millis(5));
            completion.notify(Outcome::error(1))
        });

        assert_eq!(block_on(completion.wait()), Ok(Outcome::error(1)));
        assert!(notifier.join().unwrap());
    }

    #[test]
    fn test_concurrent_notify_visibility() {
        const ROUNDS: u16 = 2000;
        let completion = leak_completion();
        let (go_tx, go_rx) = mpsc::channel::<u16>();

        // Stands in for the interrupt handler: posts whatever it is told to
        let isr = thread::spawn(move || {
            for code in go_rx {
                assert!(completion.notify(Outcome::error(code)));
            }
        });

        for code in 0..ROUNDS {
            completion.arm().unwrap();
            go_tx.send(code).unwrap();
            assert_eq!(block_on(completion.wait()), Ok(Outcome::error(code)));
        }

        drop(go_tx);
        isr.join().unwrap();
        assert_eq!(completion.fault_total(), 0);
    }

    #[test]
    fn test_cancel_notify_race_has_one_winner() {
        let completion = leak_completion();

        for _ in 0..500 {
            completion.arm().unwrap();
            let isr = thread::spawn(move || completion.notify(Outcome::Success));
            let cancel = completion.cancel();
            let delivered = isr.join().unwrap();

            let waited = block_on(completion.wait());
            match cancel {
                Cancel::Cancelled => {
                    assert!(!delivered);
                    assert_eq!(waited, Err(SyncError::Cancelled));
                }
                Cancel::TooLate(outcome) => {
                    assert!(delivered);
                    assert_eq!(waited, Ok(outcome));
                }
                Cancel::Idle => panic!("cycle was armed"),
            }
            assert_eq!(completion.phase(), Phase::Idle);
        }
    }
}
