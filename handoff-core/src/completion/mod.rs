//! Completion handoff between interrupt context and task context
//!
//! A transfer engine finishes its work inside an interrupt handler and
//! must hand the terminal [`Outcome`] to exactly one task that is parked
//! waiting for it. [`Completion`] is that single-slot handoff.

pub mod fault;
pub mod handoff;
pub mod outcome;

pub use fault::{Fault, FAULT_LOG_DEPTH};
pub use handoff::{Cancel, Completion, Phase, SyncError, Wait};
pub use outcome::{ErrorCode, Outcome};
