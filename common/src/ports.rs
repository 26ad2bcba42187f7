//! # Ports (Boundaries)
//!
//! Traits that isolate the audit logic from the infrastructure it drives.
//!
//! * [`session`]: opening a device session and talking to it.
//! * [`sink`]: persisting the running configuration.
//!
//! The core depends on these traits only; the telnet adapter and the file archive
//! implement them, and the tests substitute scripted doubles.

pub mod session;
pub mod sink;

pub use session::{Session, SessionProvider};
pub use sink::ConfigSink;
