//! Transport adapters that turn a device address into a live CLI session.
//!
//! * [`telnet`]: option negotiation on the raw byte stream.
//! * [`channel`]: prompt-driven reads and line writes on top of it.
//! * [`provider`]: login, privilege elevation and command execution.

pub mod channel;
pub mod provider;
pub mod telnet;

use fleetcheck_common::config::{Config, Protocol};
use fleetcheck_common::ports::SessionProvider;

pub use provider::{TelnetProvider, TelnetSession};

/// Builds the provider for the configured transport protocol.
pub fn session_provider(cfg: &Config) -> Box<dyn SessionProvider> {
    match cfg.transport.protocol {
        Protocol::Telnet => Box::new(TelnetProvider::from_config(cfg)),
    }
}
