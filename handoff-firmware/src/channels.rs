//! Inter-task communication
//!
//! The worker task and the bus task share nothing but this link. Jobs
//! go one way, buffers come back the other.

use handoff_drivers::EngineLink;

/// Engine side of the SPI bus task
pub static ENGINE_LINK: EngineLink = EngineLink::new();
