//! # fleetcheck core
//!
//! The per-device audit and the batch that drives it.
//!
//! * [`extract`]: pure parsers turning CLI output into facts.
//! * [`clock`]: probe the NTP server, configure it when reachable, check the clock.
//! * [`audit`]: runs every step against one open session.
//! * [`batch`]: walks the address list, one session at a time.
//! * [`archive`]: file-backed [`ConfigSink`](fleetcheck_common::ports::ConfigSink).

pub mod archive;
pub mod audit;
pub mod batch;
pub mod clock;
pub mod extract;

mod deadline;

#[cfg(test)]
mod mock;
