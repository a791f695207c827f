//! Configuration loading
//!
//! The demo config is compiled in from demo.toml and parsed by the core
//! crate's no_std parser.

pub mod loader;

pub use loader::load_config;
