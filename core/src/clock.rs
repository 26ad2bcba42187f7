//! # Clock Synchronizer
//!
//! Points the device clock at the NTP server, but only if the device can reach it:
//! 1. **Probe**: ping the server. A 0% success rate ends here with [`ClockSyncState::NotSynced`].
//! 2. **Configure**: push the timezone and `ntp server` lines.
//! 3. **Settle**: wait a fixed delay for the device to converge.
//! 4. **Verify**: read the `Clock is ...` line.

use std::time::Duration;

use fleetcheck_common::config::{Config, NtpConfig};
use fleetcheck_common::device::ClockSyncState;
use fleetcheck_common::error::SessionError;
use fleetcheck_common::ports::Session;
use fleetcheck_common::{debug, info, warn};

use crate::deadline;

pub const NTP_STATUS_COMMAND: &str = "sh ntp status | in Clock is";

const PROBE_FAILURE_MARKER: &str = "Success rate is 0 percent";
const SYNCED_MARKER: &str = "synchronized";

#[derive(Debug, Clone)]
pub struct ClockSynchronizer {
    ntp: NtpConfig,
    command_timeout: Duration,
}

impl ClockSynchronizer {
    pub fn new(ntp: NtpConfig, command_timeout: Duration) -> Self {
        Self {
            ntp,
            command_timeout,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.ntp.clone(), cfg.command_timeout)
    }

    pub fn probe_command(&self) -> String {
        format!("ping {}", self.ntp.server)
    }

    /// Runs probe, configure, settle and verify against `session`.
    ///
    /// Configuration is never pushed when the probe reports a 0% success rate.
    pub async fn synchronize(
        &self,
        session: &mut dyn Session,
    ) -> Result<ClockSyncState, SessionError> {
        let probe = deadline::execute(session, &self.probe_command(), self.command_timeout).await?;
        if probe.contains(PROBE_FAILURE_MARKER) {
            warn!("NTP server {} is unreachable, leaving clock untouched", self.ntp.server);
            return Ok(ClockSyncState::NotSynced);
        }

        info!("Configuring NTP server {}", self.ntp.server);
        deadline::configure(session, &self.ntp.commands(), self.command_timeout).await?;

        tokio::time::sleep(self.ntp.settle_delay).await;

        let status = deadline::execute(session, NTP_STATUS_COMMAND, self.command_timeout).await?;
        debug!("NTP status: {}", status.trim());
        Ok(clock_state(&status))
    }
}

fn clock_state(status: &str) -> ClockSyncState {
    if status.contains(SYNCED_MARKER) {
        ClockSyncState::Synced
    } else {
        ClockSyncState::NotSynced
    }
}
