//! Worker task orchestration
//!
//! One pass, no retries: fill the buffers, arm the handoff, start the
//! transfer, wait, then verify what came back.

pub mod pattern;
pub mod report;
pub mod worker;

pub use pattern::{count_mismatches, fill_expected, fill_send, pattern_byte};
pub use report::{CycleError, CycleReport};
pub use worker::TransferCycle;
