//! Shared building blocks for `fleetcheck`.
//!
//! * [`device`]: the facts gathered from a device and the per-device outcome.
//! * [`ports`]: the traits the core drives (sessions, session providers, config sinks).
//! * [`config`]: the run configuration handed to every component at construction.
//! * [`error`]: the error taxonomy shared by the core and its adapters.

pub mod config;
pub mod device;
pub mod error;
pub mod log;
pub mod ports;

#[doc(hidden)]
pub use tracing as __tracing;
