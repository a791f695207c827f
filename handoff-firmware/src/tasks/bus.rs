//! SPI bus task
//!
//! Runs at interrupt priority: every completion it posts comes from
//! interrupt context.

use defmt::*;

use handoff_drivers::spi::serve;
use handoff_hal_rp2040::SpiBus;

use crate::channels::ENGINE_LINK;

#[embassy_executor::task]
pub async fn bus_task(mut bus: SpiBus<'static>) {
    info!("Bus task started");
    serve(&mut bus, &ENGINE_LINK).await
}
