//! Transfer cycle configuration

use embassy_time::Duration;

use super::hardware::SpiConfig;
use crate::traits::TransferFlags;

/// Transfer size of the board-to-board demo
pub const DEFAULT_TRANSFER_SIZE: usize = 512;

/// Largest transfer the parser accepts
pub const MAX_TRANSFER_SIZE: usize = 4096;

/// Which end of the bus this worker is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    /// Drives the clock, sends the plain pattern
    Master,
    /// Follows the clock, sends the complement of the pattern
    #[default]
    Slave,
}

/// One worker cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleConfig {
    /// Bytes per transfer
    pub transfer_size: usize,
    /// Bus role, selects the send/expect patterns
    pub role: Role,
    /// Wait deadline in milliseconds; `None` waits forever
    pub timeout_ms: Option<u32>,
    /// Options passed to the engine
    pub flags: TransferFlags,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            transfer_size: DEFAULT_TRANSFER_SIZE,
            role: Role::Slave,
            timeout_ms: None,
            flags: TransferFlags::default(),
        }
    }
}

impl CycleConfig {
    /// Wait deadline as a duration
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(|ms| Duration::from_millis(ms as u64))
    }
}

/// Complete demo configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DemoConfig {
    pub spi: SpiConfig,
    pub cycle: CycleConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ChipSelect;

    #[test]
    fn test_defaults_match_board_demo() {
        let config = CycleConfig::default();
        assert_eq!(config.transfer_size, 512);
        assert_eq!(config.role, Role::Slave);
        assert_eq!(config.timeout(), None);
        assert_eq!(config.flags.chip_select, ChipSelect::Pcs0);
        assert!(config.flags.byte_swap);
    }

    #[test]
    fn test_timeout_conversion() {
        let config = CycleConfig {
            timeout_ms: Some(10),
            ..CycleConfig::default()
        };
        assert_eq!(config.timeout(), Some(Duration::from_millis(10)));
    }
}
