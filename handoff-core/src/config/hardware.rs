//! Bus hardware configuration
//!
//! Clock settings for the SPI peripheral. Chip HALs translate these into
//! their own peripheral configuration.

/// SPI bus configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Clock polarity
    pub polarity: Polarity,
    /// Clock phase
    pub phase: ClockPhase,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            frequency: 1_000_000, // 1 MHz
            polarity: Polarity::IdleLow,
            phase: ClockPhase::CaptureOnFirstTransition,
        }
    }
}

impl SpiConfig {
    /// Replace polarity and phase with those of a numbered mode
    pub fn with_mode(mut self, mode: Mode) -> Self {
        let (polarity, phase) = mode.into();
        self.polarity = polarity;
        self.phase = phase;
        self
    }

    /// The numbered mode for the current polarity and phase
    pub fn mode(&self) -> Mode {
        match (self.polarity, self.phase) {
            (Polarity::IdleLow, ClockPhase::CaptureOnFirstTransition) => Mode::Mode0,
            (Polarity::IdleLow, ClockPhase::CaptureOnSecondTransition) => Mode::Mode1,
            (Polarity::IdleHigh, ClockPhase::CaptureOnFirstTransition) => Mode::Mode2,
            (Polarity::IdleHigh, ClockPhase::CaptureOnSecondTransition) => Mode::Mode3,
        }
    }
}

/// SPI clock polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Clock idles low (CPOL=0)
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

/// SPI clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockPhase {
    /// Data captured on first clock transition (CPHA=0)
    CaptureOnFirstTransition,
    /// Data captured on second clock transition (CPHA=1)
    CaptureOnSecondTransition,
}

/// SPI mode (combined polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Mode 0: CPOL=0, CPHA=0
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl Mode {
    /// Mode from its number (0-3)
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Mode::Mode0),
            1 => Some(Mode::Mode1),
            2 => Some(Mode::Mode2),
            3 => Some(Mode::Mode3),
            _ => None,
        }
    }
}

impl From<Mode> for (Polarity, ClockPhase) {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Mode0 => (Polarity::IdleLow, ClockPhase::CaptureOnFirstTransition),
            Mode::Mode1 => (Polarity::IdleLow, ClockPhase::CaptureOnSecondTransition),
            Mode::Mode2 => (Polarity::IdleHigh, ClockPhase::CaptureOnFirstTransition),
            Mode::Mode3 => (Polarity::IdleHigh, ClockPhase::CaptureOnSecondTransition),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_round_trip() {
        for index in 0..4 {
            let mode = Mode::from_index(index).unwrap();
            assert_eq!(SpiConfig::default().with_mode(mode).mode(), mode);
        }
        assert_eq!(Mode::from_index(4), None);
    }

    #[test]
    fn test_default_is_mode0() {
        assert_eq!(SpiConfig::default().mode(), Mode::Mode0);
    }
}
