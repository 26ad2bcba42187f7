//! # Error Taxonomy
//!
//! * [`ConnectionError`]: raised while establishing a session. Demoted to a per-device skip.
//! * [`SessionError`]: raised by a live session while running a command or pushing config.
//! * [`ParseError`]: a fact extractor found no matching line or a malformed token.
//! * [`SinkError`]: the running configuration could not be persisted.
//!
//! [`AuditError`] groups everything that can abort one device once its session is open,
//! and [`FailureReason`] is what the batch records for a failed device.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failure to obtain a session for a device.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("connection to {address} timed out")]
    Timeout { address: String },

    #[error("connection to {address} was refused")]
    Refused { address: String },

    #[error("connection to {address} was reset")]
    Reset { address: String },

    #[error("invalid connection parameter for {address}: {detail}")]
    InvalidParameter { address: String, detail: String },

    #[error("authentication failed on {address}")]
    Authentication { address: String },

    #[error("i/o error while connecting to {address}: {source}")]
    Io {
        address: String,
        #[source]
        source: io::Error,
    },
}

impl ConnectionError {
    /// Classifies an I/O error raised while connecting.
    pub fn from_io(address: &str, err: io::Error) -> Self {
        let address = address.to_string();
        match err.kind() {
            io::ErrorKind::TimedOut => Self::Timeout { address },
            io::ErrorKind::ConnectionRefused => Self::Refused { address },
            io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted => {
                Self::Reset { address }
            }
            io::ErrorKind::InvalidInput => Self::InvalidParameter {
                address,
                detail: err.to_string(),
            },
            _ => Self::Io { address, source: err },
        }
    }
}

/// Failure of a live session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("`{command}` did not complete within {limit:?}")]
    Timeout { command: String, limit: Duration },

    #[error("session closed by the device")]
    Closed,

    #[error("device rejected `{line}`: {response}")]
    Rejected { line: String, response: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// An extractor could not find what it was looking for.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no hostname declaration in running configuration")]
    MissingHostname,

    #[error("no `bytes of memory` line in version output")]
    MissingModel,

    #[error("no `System image` line in version output")]
    MissingImageLine,

    #[error("failed to parse the software image name from `{token}`")]
    ImageFilename { token: String },
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("hostname `{0}` cannot be used as a file name")]
    InvalidHostname(String),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Anything that aborts the audit of a device after its session was opened.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Why a device ended up without a result.
#[derive(Debug, Error)]
pub enum FailureReason {
    #[error(transparent)]
    Connect(#[from] ConnectionError),

    #[error(transparent)]
    Audit(#[from] AuditError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unsupported transport protocol `{0}`")]
    UnknownProtocol(String),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
