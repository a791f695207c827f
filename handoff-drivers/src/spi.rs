//! SPI bus transfer engine
//!
//! The engine itself only hands jobs over. The bytes are moved by
//! [`serve`], which is meant to run in a task on a high-priority
//! interrupt executor: it is the interrupt-context side of the
//! completion handoff.
//!
//! ```text
//!  worker task (thread mode)          bus task (interrupt executor)
//!  ─────────────────────────          ─────────────────────────────
//!  completion.arm()
//!  engine.start(transfer) ──jobs──▶   bus.transfer(rx, tx).await
//!  completion.wait().await            returned ◀── transfer
//!                         ◀─notify──  completion.notify(outcome)
//!  engine.reclaim()
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embedded_hal_async::spi::{Error as _, ErrorKind, SpiBus};

use handoff_core::completion::{Completion, ErrorCode, Outcome};
use handoff_core::config::{CycleConfig, DemoConfig, Role};
use handoff_core::traits::{ChipSelect, RejectReason, Rejected, Transfer, TransferEngine};

/// Error codes reported for bus failures
pub mod codes {
    use handoff_core::completion::ErrorCode;

    pub const OVERRUN: ErrorCode = ErrorCode(1);
    pub const MODE_FAULT: ErrorCode = ErrorCode(2);
    pub const FRAME_FORMAT: ErrorCode = ErrorCode(3);
    pub const CHIP_SELECT_FAULT: ErrorCode = ErrorCode(4);
}

struct Job {
    transfer: Transfer,
    done: &'static Completion,
}

/// Mailboxes between the engine and the bus task
pub struct EngineLink {
    jobs: Signal<CriticalSectionRawMutex, Job>,
    returned: Signal<CriticalSectionRawMutex, Transfer>,
}

impl EngineLink {
    pub const fn new() -> Self {
        Self {
            jobs: Signal::new(),
            returned: Signal::new(),
        }
    }
}

impl Default for EngineLink {
    fn default() -> Self {
        Self::new()
    }
}

/// Transfer engine handing jobs to a bus task
///
/// Supports one chip select and no byte swapping; anything else is
/// rejected with [`RejectReason::UnsupportedFlags`]. An `embedded-hal`
/// bus always drives the clock, so the worker has to run the master side.
pub struct SpiEngine {
    link: &'static EngineLink,
    chip_select: ChipSelect,
    in_flight: bool,
}

impl SpiEngine {
    /// Engine for the device on `chip_select`
    pub fn new(link: &'static EngineLink, chip_select: ChipSelect) -> Self {
        Self {
            link,
            chip_select,
            in_flight: false,
        }
    }

    /// Check if a transfer was started and not yet reclaimed
    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    /// Demo configuration this engine can run
    pub fn default_config() -> DemoConfig {
        let mut config = DemoConfig::default();
        config.cycle.role = Role::Master;
        config.cycle.flags.byte_swap = false;
        config
    }

    /// Check if a cycle with this configuration can complete on this engine
    pub fn supports(config: &CycleConfig) -> bool {
        config.role == Role::Master && !config.flags.byte_swap
    }
}

impl TransferEngine for SpiEngine {
    fn start(&mut self, transfer: Transfer, done: &'static Completion) -> Result<(), Rejected> {
        if self.in_flight {
            return Err(Rejected {
                reason: RejectReason::Busy,
                transfer,
            });
        }

        let flags = transfer.flags();
        if flags.byte_swap || flags.chip_select != self.chip_select {
            return Err(Rejected {
                reason: RejectReason::UnsupportedFlags,
                transfer,
            });
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("starting {} byte transfer", transfer.len());

        self.in_flight = true;
        self.link.jobs.signal(Job { transfer, done });
        Ok(())
    }

    fn reclaim(&mut self) -> Option<Transfer> {
        let transfer = self.link.returned.try_take()?;
        self.in_flight = false;
        Some(transfer)
    }
}

/// Run the bus side forever
pub async fn serve<B: SpiBus<u8>>(bus: &mut B, link: &EngineLink) -> ! {
    loop {
        serve_one(bus, link).await;
    }
}

/// Wait for one job, move its bytes, hand the buffers back, then notify
pub async fn serve_one<B: SpiBus<u8>>(bus: &mut B, link: &EngineLink) {
    let Job { mut transfer, done } = link.jobs.wait().await;

    let outcome = run_transfer(bus, &mut transfer).await;

    // Buffers go back first so the woken worker can reclaim them at once
    link.returned.signal(transfer);
    done.notify(outcome);
}

async fn run_transfer<B: SpiBus<u8>>(bus: &mut B, transfer: &mut Transfer) -> Outcome {
    if transfer.is_empty() {
        return Outcome::Success;
    }

    let (tx, rx) = transfer.split_mut();
    let result = match bus.transfer(rx, tx).await {
        Ok(()) => bus.flush().await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => Outcome::Success,
        Err(e) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("SPI transfer failed: {}", defmt::Debug2Format(&e.kind()));
            Outcome::Error(error_code(e.kind()))
        }
    }
}

/// Map a bus error to the code posted with the outcome
pub fn error_code(kind: ErrorKind) -> ErrorCode {
    match kind {
        ErrorKind::Overrun => codes::OVERRUN,
        ErrorKind::ModeFault => codes::MODE_FAULT,
        ErrorKind::FrameFormat => codes::FRAME_FORMAT,
        ErrorKind::ChipSelectFault => codes::CHIP_SELECT_FAULT,
        _ => ErrorCode::UNKNOWN,
    }
}
