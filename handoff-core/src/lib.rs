//! Board-agnostic core logic for the Handoff transfer demo
//!
//! This crate contains everything that does not depend on a specific
//! chip or bus peripheral:
//!
//! - Completion synchronizer (interrupt context → task context handoff)
//! - Transfer request and transfer engine trait
//! - Worker cycle orchestration and pattern verification
//! - Static slot allocation for the synchronizer and buffers
//! - Configuration types and the embedded config parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod completion;
pub mod config;
pub mod cycle;
pub mod slot;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use completion::{Cancel, Completion, ErrorCode, Fault, Outcome, Phase, SyncError};
pub use cycle::{CycleError, CycleReport, TransferCycle};
pub use traits::{RejectReason, Rejected, Transfer, TransferEngine, TransferFlags};
