//! Transfer engine implementations
//!
//! This crate provides concrete implementations of the
//! [`handoff_core::TransferEngine`] trait:
//!
//! - SPI bus engine over any `embedded-hal-async` SPI bus, completed from
//!   a task running in interrupt context

#![no_std]
#![deny(unsafe_code)]

pub mod spi;

pub use spi::{EngineLink, SpiEngine};
