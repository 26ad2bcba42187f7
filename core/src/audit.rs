//! # Device Audit
//!
//! Runs the full sequence against one open session:
//! 1. Read the hostname and back up the running configuration.
//! 2. Read CDP status and adjacencies.
//! 3. Read the device model and software image.
//! 4. Run the [`ClockSynchronizer`].
//!
//! The first failing step aborts the remaining ones for that device.

use std::time::Duration;

use chrono::NaiveDate;
use fleetcheck_common::config::Config;
use fleetcheck_common::device::{CdpState, DeviceResult, ImageFacts};
use fleetcheck_common::error::AuditError;
use fleetcheck_common::ports::{ConfigSink, Session};
use fleetcheck_common::{debug, info};

use crate::clock::ClockSynchronizer;
use crate::{deadline, extract};

pub const HOSTNAME_COMMAND: &str = "sh run | in hostname";
pub const RUNNING_CONFIG_COMMAND: &str = "sh run";
pub const CDP_COMMAND: &str = "sh cdp entry * | in Device.ID";
pub const MEMORY_COMMAND: &str = "sh version | in bytes of memory";
pub const IMAGE_COMMAND: &str = "sh version | in System image";

pub struct DeviceAuditor {
    sink: Box<dyn ConfigSink>,
    clock: ClockSynchronizer,
    command_timeout: Duration,
}

impl DeviceAuditor {
    pub fn new(sink: Box<dyn ConfigSink>, clock: ClockSynchronizer, command_timeout: Duration) -> Self {
        Self {
            sink,
            clock,
            command_timeout,
        }
    }

    pub fn from_config(cfg: &Config, sink: Box<dyn ConfigSink>) -> Self {
        Self::new(sink, ClockSynchronizer::from_config(cfg), cfg.command_timeout)
    }

    pub fn command_timeout(&self) -> Duration {
        self.command_timeout
    }

    /// Audits the device behind `session`. `date` keys the configuration backup.
    pub async fn audit(
        &self,
        session: &mut dyn Session,
        date: NaiveDate,
    ) -> Result<DeviceResult, AuditError> {
        let hostname = self.backup_running_config(session, date).await?;
        let cdp = self.query_cdp(session).await?;
        let image = self.query_image(session).await?;

        info!("Checking clock synchronization on {hostname}");
        let clock = self.clock.synchronize(session).await?;

        Ok(DeviceResult {
            hostname,
            image,
            cdp,
            clock,
        })
    }

    async fn backup_running_config(
        &self,
        session: &mut dyn Session,
        date: NaiveDate,
    ) -> Result<String, AuditError> {
        let declaration = self.execute(session, HOSTNAME_COMMAND).await?;
        let hostname = extract::extract_hostname(&declaration)?;

        let running_config = self.execute(session, RUNNING_CONFIG_COMMAND).await?;
        self.sink.save(&hostname, date, &running_config).await?;
        debug!("Saved running configuration of {hostname}");

        Ok(hostname)
    }

    async fn query_cdp(&self, session: &mut dyn Session) -> Result<CdpState, AuditError> {
        let entries = self.execute(session, CDP_COMMAND).await?;
        Ok(extract::extract_cdp_state(&entries))
    }

    async fn query_image(&self, session: &mut dyn Session) -> Result<ImageFacts, AuditError> {
        let memory = self.execute(session, MEMORY_COMMAND).await?;
        let image = self.execute(session, IMAGE_COMMAND).await?;
        let facts = extract::extract_image_facts(&format!("{memory}\n{image}"))?;
        Ok(facts)
    }

    async fn execute(&self, session: &mut dyn Session, command: &str) -> Result<String, AuditError> {
        Ok(deadline::execute(session, command, self.command_timeout).await?)
    }
}
