//! RP2040-specific HAL glue for the transfer demo
//!
//! Maps the board-agnostic bus configuration onto `embassy-rp` and
//! builds the async (DMA-driven) SPI bus the bus task serves.

#![no_std]

pub mod spi;

pub use spi::{bus_config, SpiBus, SpiPins};
