//! Host-side stand-ins for the interrupt-driven transfer engine

use std::boxed::Box;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use std::vec::Vec;

use crate::completion::{Completion, Outcome};
use crate::config::Role;
use crate::traits::{RejectReason, Rejected, Transfer, TransferEngine};

/// A handoff that lives for the rest of the test process
pub fn leak_completion() -> &'static Completion {
    Box::leak(Box::new(Completion::new()))
}

/// A zeroed buffer that lives for the rest of the test process
pub fn leak_buffer(len: usize) -> &'static mut [u8] {
    Box::leak(std::vec![0u8; len].into_boxed_slice())
}

/// How the simulated bus peer behaves
#[derive(Debug, Clone, Copy)]
pub enum Peer {
    /// Clocks out its own pattern and completes successfully
    Echo,
    /// Like `Echo`, but flips the byte at this index
    Corrupt(usize),
    /// Completes with this error code without moving data
    Fail(u16),
    /// Never completes; the buffers are never handed back
    Silent,
}

/// Transfer engine that completes from a separate thread
///
/// The thread plays the interrupt handler: it moves the data, hands the
/// buffers back and then notifies, in that order.
pub struct LoopbackEngine {
    local: Role,
    peer: Peer,
    delay: Duration,
    in_flight: Arc<AtomicBool>,
    returned: Arc<Mutex<Option<Transfer>>>,
    swallowed: Option<Transfer>,
    peer_received: Arc<Mutex<Vec<u8>>>,
}

impl LoopbackEngine {
    /// Engine talking to the peer of a `local` worker
    pub fn new(local: Role, peer: Peer) -> Self {
        Self {
            local,
            peer,
            delay: Duration::from_millis(1),
            in_flight: Arc::new(AtomicBool::new(false)),
            returned: Arc::new(Mutex::new(None)),
            swallowed: None,
            peer_received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Delay between start and completion
    pub fn with_delay_ms(mut self, ms: u64) -> Self {
        self.delay = Duration::from_millis(ms);
        self
    }

    /// Pretend a transfer is already in flight
    pub fn busy(self) -> Self {
        self.in_flight.store(true, Ordering::SeqCst);
        self
    }

    /// What the peer received during the last transfer
    pub fn peer_received(&self) -> Vec<u8> {
        self.peer_received.lock().unwrap().clone()
    }
}

impl TransferEngine for LoopbackEngine {
    fn start(&mut self, mut transfer: Transfer, done: &'static Completion) -> Result<(), Rejected> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(Rejected {
                reason: RejectReason::Busy,
                transfer,
            });
        }

        if let Peer::Silent = self.peer {
            self.swallowed = Some(transfer);
            return Ok(());
        }

        let peer = self.peer;
        let peer_role = self.local.peer();
        let delay = self.delay;
        let in_flight = self.in_flight.clone();
        let returned = self.returned.clone();
        let peer_received = self.peer_received.clone();

        thread::spawn(move || {
            thread::sleep(delay);

            let outcome = match peer {
                Peer::Fail(code) => Outcome::error(code),
                Peer::Echo | Peer::Corrupt(_) | Peer::Silent => {
                    let (tx, rx) = transfer.split_mut();
                    *peer_received.lock().unwrap() = tx.to_vec();
                    for (i, byte) in rx.iter_mut().enumerate() {
                        *byte = peer_role.send_byte(i);
                    }
                    if let Peer::Corrupt(index) = peer {
                        if let Some(byte) = rx.get_mut(index) {
                            *byte = !*byte;
                        }
                    }
                    Outcome::Success
                }
            };

            *returned.lock().unwrap() = Some(transfer);
            in_flight.store(false, Ordering::SeqCst);
            done.notify(outcome);
        });

        Ok(())
    }

    fn reclaim(&mut self) -> Option<Transfer> {
        self.returned.lock().unwrap().take()
    }
}
