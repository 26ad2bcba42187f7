use async_trait::async_trait;

use crate::device::{Credentials, DeviceAddress};
use crate::error::{ConnectionError, SessionError};

/// A live command/response channel to a single device.
///
/// A session is owned by one audit at a time and is closed when the audit ends,
/// whether it succeeded or not.
#[async_trait]
pub trait Session: Send {
    /// Runs a read-only command and returns its raw text output.
    async fn execute(&mut self, command: &str) -> Result<String, SessionError>;

    /// Applies configuration lines in order, entering configuration mode as needed.
    async fn configure(&mut self, lines: &[String]) -> Result<(), SessionError>;

    /// Releases the underlying channel.
    async fn close(&mut self) -> Result<(), SessionError>;
}

/// Establishes sessions to devices.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn open(
        &self,
        address: &DeviceAddress,
        credentials: &Credentials,
    ) -> Result<Box<dyn Session>, ConnectionError>;
}
