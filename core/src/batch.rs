//! # Batch Runner
//!
//! Walks the address list strictly in order, one session at a time. Whatever goes
//! wrong with one device is recorded against it and the batch moves on.

use chrono::{Local, NaiveDate};
use fleetcheck_common::device::{
    BatchOutcome, Credentials, DeviceAddress, DeviceFailure, DeviceOutcome,
};
use fleetcheck_common::error::FailureReason;
use fleetcheck_common::ports::SessionProvider;
use fleetcheck_common::{debug, error, info, success, warn};
use tracing::{Instrument, info_span};

use crate::audit::DeviceAuditor;
use crate::deadline;

pub struct BatchRunner {
    provider: Box<dyn SessionProvider>,
    auditor: DeviceAuditor,
    date: Option<NaiveDate>,
}

impl BatchRunner {
    pub fn new(provider: Box<dyn SessionProvider>, auditor: DeviceAuditor) -> Self {
        Self {
            provider,
            auditor,
            date: None,
        }
    }

    /// Pins the date used to name configuration backups. Defaults to the local date
    /// at the time each device is processed.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Audits every address in order.
    ///
    /// `on_outcome` is called with the input position as soon as a device is done,
    /// so results can be reported while the batch is still running.
    pub async fn run<F>(
        &self,
        addresses: &[DeviceAddress],
        credentials: &Credentials,
        mut on_outcome: F,
    ) -> BatchOutcome
    where
        F: FnMut(usize, &DeviceOutcome),
    {
        let mut batch = BatchOutcome::new();

        for (idx, address) in addresses.iter().enumerate() {
            let span = info_span!("device", %address);
            let outcome = self.process(address, credentials).instrument(span).await;
            on_outcome(idx, &outcome);
            batch.push(outcome);
        }

        batch
    }

    async fn process(&self, address: &DeviceAddress, credentials: &Credentials) -> DeviceOutcome {
        info!("Connecting to {address}");
        let mut session = match self.provider.open(address, credentials).await {
            Ok(session) => session,
            Err(err) => {
                warn!("{err}");
                return failed(address, err.into());
            }
        };

        let date = self.date.unwrap_or_else(|| Local::now().date_naive());
        let audited = self.auditor.audit(session.as_mut(), date).await;

        if let Err(err) = deadline::close(session.as_mut(), self.auditor.command_timeout()).await {
            debug!("Failed to close session to {address}: {err}");
        }

        match audited {
            Ok(result) => {
                success!("Audited {address} ({})", result.hostname);
                DeviceOutcome::Audited(result)
            }
            Err(err) => {
                error!("Audit of {address} failed: {err}");
                failed(address, err.into())
            }
        }
    }
}

fn failed(address: &DeviceAddress, reason: FailureReason) -> DeviceOutcome {
    DeviceOutcome::Failed(DeviceFailure {
        address: address.clone(),
        reason,
    })
}
