//! Deadlines around session calls.
//!
//! A device that stops answering must not stall the batch, so every call the
//! core makes on a session goes through one of these wrappers.

use std::time::Duration;

use fleetcheck_common::error::SessionError;
use fleetcheck_common::ports::Session;
use tokio::time::timeout;

pub(crate) async fn execute(
    session: &mut dyn Session,
    command: &str,
    limit: Duration,
) -> Result<String, SessionError> {
    match timeout(limit, session.execute(command)).await {
        Ok(output) => output,
        Err(_elapsed) => Err(expired(command, limit)),
    }
}

pub(crate) async fn configure(
    session: &mut dyn Session,
    lines: &[String],
    limit: Duration,
) -> Result<(), SessionError> {
    match timeout(limit, session.configure(lines)).await {
        Ok(res) => res,
        Err(_elapsed) => Err(expired("configure terminal", limit)),
    }
}

pub(crate) async fn close(session: &mut dyn Session, limit: Duration) -> Result<(), SessionError> {
    match timeout(limit, session.close()).await {
        Ok(res) => res,
        Err(_elapsed) => Err(expired("exit", limit)),
    }
}

fn expired(command: &str, limit: Duration) -> SessionError {
    SessionError::Timeout {
        command: command.to_string(),
        limit,
    }
}
