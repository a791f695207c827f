//! Configuration types
//!
//! Board-agnostic configuration for the bus and the transfer cycle, plus
//! the small TOML subset parser used for the embedded demo config.

pub mod hardware;
pub mod toml;
pub mod types;

pub use hardware::*;
pub use toml::{parse_config, parse_config_onto, ParseError};
pub use types::*;
