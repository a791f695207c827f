//! Transfer requests and the transfer engine trait

use crate::completion::Completion;

/// Peripheral chip select used for the transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipSelect {
    #[default]
    Pcs0,
    Pcs1,
    Pcs2,
    Pcs3,
}

impl ChipSelect {
    /// Chip select from its index (0-3)
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(ChipSelect::Pcs0),
            1 => Some(ChipSelect::Pcs1),
            2 => Some(ChipSelect::Pcs2),
            3 => Some(ChipSelect::Pcs3),
            _ => None,
        }
    }
}

/// Per-transfer options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferFlags {
    /// Chip select the transfer runs on
    pub chip_select: ChipSelect,
    /// Swap byte order within each frame
    pub byte_swap: bool,
}

impl Default for TransferFlags {
    fn default() -> Self {
        Self {
            chip_select: ChipSelect::Pcs0,
            byte_swap: true,
        }
    }
}

/// Invalid transfer request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestError {
    /// Send buffer shorter than the transfer length
    SendBufferTooShort,
    /// Receive buffer shorter than the transfer length
    ReceiveBufferTooShort,
}

/// One transfer: both buffers plus its length and options
///
/// The buffers are exclusive `'static` borrows. Starting a transfer
/// moves them into the engine, so nothing else can touch them until the
/// engine hands them back through [`TransferEngine::reclaim`].
#[derive(Debug)]
pub struct Transfer {
    tx: &'static mut [u8],
    rx: &'static mut [u8],
    len: usize,
    flags: TransferFlags,
}

impl Transfer {
    /// Build a transfer of `len` bytes
    pub fn new(
        tx: &'static mut [u8],
        rx: &'static mut [u8],
        len: usize,
        flags: TransferFlags,
    ) -> Result<Self, RequestError> {
        if tx.len() < len {
            return Err(RequestError::SendBufferTooShort);
        }
        if rx.len() < len {
            return Err(RequestError::ReceiveBufferTooShort);
        }
        Ok(Self { tx, rx, len, flags })
    }

    /// Transfer length in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check for a zero-length transfer
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Transfer options
    pub fn flags(&self) -> TransferFlags {
        self.flags
    }

    /// Bytes to send
    pub fn tx(&self) -> &[u8] {
        &self.tx[..self.len]
    }

    /// Bytes received
    pub fn rx(&self) -> &[u8] {
        &self.rx[..self.len]
    }

    /// Mutable access to the bytes to send
    pub fn tx_mut(&mut self) -> &mut [u8] {
        &mut self.tx[..self.len]
    }

    /// Send and receive halves, for the engine moving the data
    pub fn split_mut(&mut self) -> (&[u8], &mut [u8]) {
        (&self.tx[..self.len], &mut self.rx[..self.len])
    }

    /// Give the buffers back
    pub fn into_buffers(self) -> (&'static mut [u8], &'static mut [u8]) {
        (self.tx, self.rx)
    }
}

/// Why an engine refused to start a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RejectReason {
    /// A transfer is already in flight
    Busy,
    /// The engine can't honour the requested flags
    UnsupportedFlags,
}

/// A refused transfer, returned together with its buffers
#[derive(Debug)]
pub struct Rejected {
    pub reason: RejectReason,
    pub transfer: Transfer,
}

/// Asynchronous transfer engine
///
/// Implementations own the bus peripheral. `start` begins the transfer
/// and returns immediately; the engine later calls
/// [`Completion::notify`] on `done` exactly once, usually from interrupt
/// context, with the terminal outcome.
pub trait TransferEngine {
    /// Begin a transfer
    ///
    /// On refusal the buffers come back in [`Rejected`] and `done` is
    /// never notified.
    fn start(&mut self, transfer: Transfer, done: &'static Completion) -> Result<(), Rejected>;

    /// Take the buffers back after completion was observed
    ///
    /// Returns `None` while the transfer is still in flight.
    fn reclaim(&mut self) -> Option<Transfer>;
}
