//! Static storage for the handoff and the transfer buffers
//!
//! The handoff is shared with interrupt context and the buffers are lent
//! to the engine, so both need `'static` storage. Each slot hands out its
//! contents once; a second claim is an allocation failure.

use static_cell::StaticCell;

use crate::completion::Completion;
use crate::cycle::CycleError;

/// Storage for one [`Completion`]
pub struct CompletionSlot {
    cell: StaticCell<Completion>,
}

impl CompletionSlot {
    pub const fn new() -> Self {
        Self {
            cell: StaticCell::new(),
        }
    }

    /// Create the handoff in this slot
    pub fn claim(&'static self) -> Result<&'static Completion, CycleError> {
        match self.cell.try_init(Completion::new()) {
            Some(completion) => Ok(&*completion),
            None => Err(CycleError::AllocationFailure),
        }
    }
}

impl Default for CompletionSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Storage for one `N`-byte transfer buffer
pub struct BufferSlot<const N: usize> {
    cell: StaticCell<[u8; N]>,
}

impl<const N: usize> BufferSlot<N> {
    pub const fn new() -> Self {
        Self {
            cell: StaticCell::new(),
        }
    }

    /// Take the zeroed buffer
    pub fn claim(&'static self) -> Result<&'static mut [u8], CycleError> {
        match self.cell.try_init([0; N]) {
            Some(buf) => Ok(&mut buf[..]),
            None => Err(CycleError::AllocationFailure),
        }
    }
}

impl<const N: usize> Default for BufferSlot<N> {
    fn default() -> Self {
        Self::new()
    }
}
