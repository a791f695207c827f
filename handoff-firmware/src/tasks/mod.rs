//! Embassy async tasks
//!
//! The bus task runs on the interrupt executor, the worker on the
//! thread executor. They meet at [`crate::channels::ENGINE_LINK`].

pub mod bus;
pub mod worker;

pub use bus::bus_task;
pub use worker::worker_task;
