//! Cycle results and the error taxonomy

use crate::completion::{ErrorCode, Outcome, SyncError};
use crate::traits::{RejectReason, RequestError};

/// Summary of a verified transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    /// Outcome posted by the engine
    pub outcome: Outcome,
    /// Bytes compared
    pub bytes: usize,
    /// Bytes that differed from the expected pattern
    pub mismatches: usize,
}

impl CycleReport {
    /// Check if every received byte matched
    pub fn all_matched(&self) -> bool {
        self.outcome.is_success() && self.mismatches == 0
    }
}

/// Everything that can end a transfer cycle early
///
/// Errors stay local to one cycle and nothing is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleError {
    /// Synchronizer or buffer storage could not be claimed
    AllocationFailure,
    /// Buffers don't fit the configured transfer
    InvalidRequest(RequestError),
    /// Handoff misuse
    Sync(SyncError),
    /// Engine refused to start the transfer
    Rejected(RejectReason),
    /// Engine completed with an error
    TransferError(ErrorCode),
    /// Engine reported success but the data is wrong
    DataIntegrity { mismatches: usize },
    /// No completion before the deadline; the engine still owns the buffers
    Timeout,
    /// Cycle was cancelled while waiting
    Cancelled,
    /// Buffers are still held by the engine
    BuffersInFlight,
}

impl CycleError {
    /// Check if the buffers may still be written by the engine
    pub fn buffers_in_flight(&self) -> bool {
        matches!(self, CycleError::Timeout | CycleError::BuffersInFlight)
    }
}

impl From<SyncError> for CycleError {
    fn from(e: SyncError) -> Self {
        match e {
            SyncError::Timeout => CycleError::Timeout,
            SyncError::Cancelled => CycleError::Cancelled,
            other => CycleError::Sync(other),
        }
    }
}

impl From<RequestError> for CycleError {
    fn from(e: RequestError) -> Self {
        CycleError::InvalidRequest(e)
    }
}
