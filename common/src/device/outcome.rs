//! Per-device outcomes and the ordered outcome of a whole batch.

use std::fmt;

use crate::device::{DeviceAddress, DeviceResult};
use crate::error::FailureReason;

#[derive(Debug)]
pub struct DeviceFailure {
    pub address: DeviceAddress,
    pub reason: FailureReason,
}

/// Every failure prints the same short line; the reason only goes to the log.
impl fmt::Display for DeviceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to connect to {}", self.address)
    }
}

#[derive(Debug)]
pub enum DeviceOutcome {
    Audited(DeviceResult),
    Failed(DeviceFailure),
}

impl DeviceOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, DeviceOutcome::Failed(_))
    }
}

impl fmt::Display for DeviceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceOutcome::Audited(result) => fmt::Display::fmt(result, f),
            DeviceOutcome::Failed(failure) => fmt::Display::fmt(failure, f),
        }
    }
}

/// One outcome per input address, in input order.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    entries: Vec<DeviceOutcome>,
}

impl BatchOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, outcome: DeviceOutcome) {
        self.entries.push(outcome);
    }

    pub fn entries(&self) -> &[DeviceOutcome] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_failure()).count()
    }

    pub fn has_failures(&self) -> bool {
        self.entries.iter().any(DeviceOutcome::is_failure)
    }

    pub fn report_lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }
}
