//! Worker task
//!
//! Runs one transfer cycle against the peer board, logs the verdict and
//! parks. Storage for the handoff and both buffers is static and claimed
//! once; a second claim is an allocation failure.

use defmt::*;

use handoff_core::config::{CycleConfig, MAX_TRANSFER_SIZE};
use handoff_core::cycle::{CycleError, CycleReport, TransferCycle};
use handoff_core::slot::{BufferSlot, CompletionSlot};
use handoff_drivers::SpiEngine;

use crate::channels::ENGINE_LINK;

static COMPLETION: CompletionSlot = CompletionSlot::new();
static TX_BUF: BufferSlot<MAX_TRANSFER_SIZE> = BufferSlot::new();
static RX_BUF: BufferSlot<MAX_TRANSFER_SIZE> = BufferSlot::new();

#[embassy_executor::task]
pub async fn worker_task(config: CycleConfig) {
    info!(
        "Worker task started: {} bytes as {}",
        config.transfer_size, config.role
    );

    match run_demo(config).await {
        Ok(report) => info!("Transfer of {} bytes: all matched", report.bytes),
        Err(CycleError::DataIntegrity { mismatches }) => {
            error!(
                "Transfer of {} bytes: {} mismatched",
                config.transfer_size, mismatches
            )
        }
        Err(e) => error!("Transfer cycle failed: {}", e),
    }

    // Nothing left to do
    core::future::pending::<()>().await;
}

async fn run_demo(config: CycleConfig) -> Result<CycleReport, CycleError> {
    let completion = COMPLETION.claim()?;
    let tx = TX_BUF.claim()?;
    let rx = RX_BUF.claim()?;

    let mut cycle = TransferCycle::new(completion, tx, rx, config)?;
    let mut engine = SpiEngine::new(&ENGINE_LINK, config.flags.chip_select);

    let result = cycle.run(&mut engine).await;

    if result == Err(CycleError::Timeout) {
        match cycle.recover(&mut engine).await {
            Ok(Some(outcome)) => warn!("Transfer finished late: {}", outcome),
            Ok(None) => info!("Buffers recovered after timeout"),
            Err(e) => warn!("Buffers still with the bus: {}", e),
        }
    }

    while let Some(fault) = completion.take_fault() {
        warn!("Stray completion: {}", fault);
    }

    result
}
