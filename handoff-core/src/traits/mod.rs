//! Hardware abstraction traits
//!
//! These traits define the interface between the transfer logic and the
//! bus peripheral that actually moves the bytes.

pub mod transfer;

pub use transfer::{
    ChipSelect, RejectReason, Rejected, RequestError, Transfer, TransferEngine, TransferFlags,
};
