//! Embedded configuration
//!
//! Parsed on top of the bus engine's defaults. Falls back to those
//! defaults if the embedded file does not parse, or asks for something
//! this board cannot run.

use defmt::*;

use handoff_core::config::{parse_config_onto, DemoConfig};
use handoff_drivers::SpiEngine;

/// Embedded demo configuration (compiled into firmware)
/// Edit demo.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../../demo.toml");

/// Parse the embedded configuration
pub fn load_config() -> DemoConfig {
    let defaults = SpiEngine::default_config();

    let config = match parse_config_onto(defaults, EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            // build.rs validates demo.toml, so this is a parser mismatch
            warn!("Failed to parse embedded config: {}", e);
            warn!("Using board default configuration");
            return defaults;
        }
    };

    if !SpiEngine::supports(&config.cycle) {
        warn!(
            "Config asks for {} with byte_swap={}, bus only runs master without swap",
            config.cycle.role, config.cycle.flags.byte_swap
        );
        warn!("Using board default configuration");
        return defaults;
    }

    info!(
        "Config: {} bytes as {}, timeout {} ms",
        config.cycle.transfer_size,
        config.cycle.role,
        config.cycle.timeout_ms
    );
    config
}
