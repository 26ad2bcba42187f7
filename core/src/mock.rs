//! Scripted doubles for the ports, used by the unit tests.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use fleetcheck_common::error::{SessionError, SinkError};
use fleetcheck_common::ports::{ConfigSink, Session};

/// Every call a [`ScriptedSession`] received.
#[derive(Debug, Default)]
pub struct CallLog {
    pub executed: Vec<String>,
    pub configured: Vec<Vec<String>>,
    pub closed: bool,
}

/// A session answering from a command → output table. Unknown commands yield
/// empty output, like a filter that matched nothing.
#[derive(Default)]
pub struct ScriptedSession {
    responses: HashMap<String, String>,
    hang_on: Option<String>,
    reject_config: bool,
    log: Arc<Mutex<CallLog>>,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, command: &str, output: &str) -> Self {
        self.responses.insert(command.to_string(), output.to_string());
        self
    }

    /// Never answers `command`.
    pub fn hang_on(mut self, command: &str) -> Self {
        self.hang_on = Some(command.to_string());
        self
    }

    pub fn reject_config(mut self) -> Self {
        self.reject_config = true;
        self
    }

    pub fn log(&self) -> Arc<Mutex<CallLog>> {
        self.log.clone()
    }
}

#[async_trait]
impl Session for ScriptedSession {
    async fn execute(&mut self, command: &str) -> Result<String, SessionError> {
        self.log.lock().unwrap().executed.push(command.to_string());
        if self.hang_on.as_deref() == Some(command) {
            std::future::pending::<()>().await;
        }
        Ok(self.responses.get(command).cloned().unwrap_or_default())
    }

    async fn configure(&mut self, lines: &[String]) -> Result<(), SessionError> {
        self.log.lock().unwrap().configured.push(lines.to_vec());
        if self.reject_config {
            return Err(SessionError::Rejected {
                line: lines.first().cloned().unwrap_or_default(),
                response: "% Invalid input detected at '^' marker.".to_string(),
            });
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        self.log.lock().unwrap().closed = true;
        Ok(())
    }
}

/// Refuses every save, as a full or read-only disk would.
pub struct FailingSink;

#[async_trait]
impl ConfigSink for FailingSink {
    async fn save(&self, hostname: &str, _date: NaiveDate, _content: &str) -> Result<(), SinkError> {
        Err(SinkError::Write {
            path: PathBuf::from(format!("_output/{hostname}")),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        })
    }
}

/// Keeps saved configurations in memory.
#[derive(Default, Clone)]
pub struct MemorySink {
    pub saved: Arc<Mutex<Vec<(String, NaiveDate, String)>>>,
}

#[async_trait]
impl ConfigSink for MemorySink {
    async fn save(&self, hostname: &str, date: NaiveDate, content: &str) -> Result<(), SinkError> {
        self.saved
            .lock()
            .unwrap()
            .push((hostname.to_string(), date, content.to_string()));
        Ok(())
    }
}
