//! Handoff - SPI transfer completion demo
//!
//! Exchanges one buffer with a peer board over SPI0. The bus task runs on
//! an interrupt executor so the transfer completes in interrupt context;
//! the worker on the thread executor is woken by the completion handoff
//! and verifies what came back.
//!
//! Wiring (SPI0): GPIO18 SCK, GPIO19 MOSI, GPIO16 MISO, GPIO17 CS.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use {defmt_rtt as _, panic_probe as _};

use handoff_hal_rp2040::{SpiBus, SpiPins};

mod channels;
mod config;
mod tasks;

/// Executor for the bus task, driven from the SWI_IRQ_1 handler
static EXECUTOR_BUS: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_BUS.on_interrupt()
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Handoff firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load_config();

    let bus = SpiBus::new(
        p.SPI0,
        SpiPins {
            clk: p.PIN_18,
            mosi: p.PIN_19,
            miso: p.PIN_16,
            cs: p.PIN_17,
            tx_dma: p.DMA_CH0,
            rx_dma: p.DMA_CH1,
        },
        &config.spi,
    );
    info!("SPI bus initialized");

    // Bus completions preempt the thread-mode worker
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let bus_spawner = EXECUTOR_BUS.start(interrupt::SWI_IRQ_1);

    bus_spawner.spawn(tasks::bus_task(bus)).unwrap();
    spawner.spawn(tasks::worker_task(config.cycle)).unwrap();

    info!("All tasks spawned, firmware running");
}
