//! SPI bus for the transfer demo
//!
//! The RP2040 SPI block does not drive its chip select while DMA runs a
//! long transfer, so the bus owns a GPIO for it and holds it low for the
//! whole transfer.

use embassy_rp::dma::Channel;
use embassy_rp::gpio::{Level, Output, Pin};
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{self, Async, ClkPin, MisoPin, MosiPin, Spi};
use embassy_rp::Peri;
use embedded_hal_async::spi::{ErrorType, SpiBus as AsyncSpiBus};

use handoff_core::config::{ClockPhase, Polarity, SpiConfig};

/// Translate the board-agnostic clock settings
pub fn bus_config(config: &SpiConfig) -> spi::Config {
    let mut out = spi::Config::default();
    out.frequency = config.frequency;
    out.polarity = match config.polarity {
        Polarity::IdleLow => spi::Polarity::IdleLow,
        Polarity::IdleHigh => spi::Polarity::IdleHigh,
    };
    out.phase = match config.phase {
        ClockPhase::CaptureOnFirstTransition => spi::Phase::CaptureOnFirstTransition,
        ClockPhase::CaptureOnSecondTransition => spi::Phase::CaptureOnSecondTransition,
    };
    out
}

/// Pins and DMA channels for SPI0
pub struct SpiPins<'d, Clk, Mosi, Miso, Cs, TxDma, RxDma>
where
    Clk: ClkPin<SPI0>,
    Mosi: MosiPin<SPI0>,
    Miso: MisoPin<SPI0>,
    Cs: Pin,
    TxDma: Channel,
    RxDma: Channel,
{
    pub clk: Peri<'d, Clk>,
    pub mosi: Peri<'d, Mosi>,
    pub miso: Peri<'d, Miso>,
    pub cs: Peri<'d, Cs>,
    pub tx_dma: Peri<'d, TxDma>,
    pub rx_dma: Peri<'d, RxDma>,
}

/// DMA-driven SPI0 with a software chip select
pub struct SpiBus<'d> {
    spi: Spi<'d, SPI0, Async>,
    cs: Output<'d>,
}

impl<'d> SpiBus<'d> {
    /// Set up SPI0 as controller on the given pins
    pub fn new<Clk, Mosi, Miso, Cs, TxDma, RxDma>(
        inner: Peri<'d, SPI0>,
        pins: SpiPins<'d, Clk, Mosi, Miso, Cs, TxDma, RxDma>,
        config: &SpiConfig,
    ) -> Self
    where
        Clk: ClkPin<SPI0>,
        Mosi: MosiPin<SPI0>,
        Miso: MisoPin<SPI0>,
        Cs: Pin,
        TxDma: Channel,
        RxDma: Channel,
    {
        #[cfg(feature = "defmt")]
        defmt::info!(
            "SPI0: {} Hz, mode {}",
            config.frequency,
            config.mode()
        );

        let spi = Spi::new(
            inner,
            pins.clk,
            pins.mosi,
            pins.miso,
            pins.tx_dma,
            pins.rx_dma,
            bus_config(config),
        );

        Self {
            spi,
            cs: Output::new(pins.cs, Level::High),
        }
    }
}

impl ErrorType for SpiBus<'_> {
    type Error = spi::Error;
}

impl AsyncSpiBus<u8> for SpiBus<'_> {
    async fn read(&mut self, words: &mut [u8]) -> Result<(), spi::Error> {
        self.cs.set_low();
        let result = AsyncSpiBus::read(&mut self.spi, words).await;
        self.cs.set_high();
        result
    }

    async fn write(&mut self, words: &[u8]) -> Result<(), spi::Error> {
        self.cs.set_low();
        let result = AsyncSpiBus::write(&mut self.spi, words).await;
        self.cs.set_high();
        result
    }

    async fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), spi::Error> {
        self.cs.set_low();
        let result = match AsyncSpiBus::transfer(&mut self.spi, read, write).await {
            Ok(()) => AsyncSpiBus::flush(&mut self.spi).await,
            Err(e) => Err(e),
        };
        self.cs.set_high();
        result
    }

    async fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), spi::Error> {
        self.cs.set_low();
        let result = AsyncSpiBus::transfer_in_place(&mut self.spi, words).await;
        self.cs.set_high();
        result
    }

    async fn flush(&mut self) -> Result<(), spi::Error> {
        AsyncSpiBus::flush(&mut self.spi).await
    }
}
