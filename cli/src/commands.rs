pub mod audit;

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, CommandFactory, Parser};
use fleetcheck_common::config::Config;
use fleetcheck_common::error::ConfigError;

#[derive(Parser)]
#[command(name = "fleetcheck")]
#[command(about = "Back up, inspect and time-sync a fleet of network devices.")]
#[command(version)]
pub struct CommandLine {
    /// Comma-separated device addresses, e.g. 10.0.0.1,10.0.0.2
    pub devices: Option<String>,

    /// Login username; prompted for when omitted
    #[arg(short, long)]
    pub username: Option<String>,

    /// Path to a TOML config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// NTP server to probe and configure
    #[arg(long, value_name = "ADDRESS")]
    pub ntp_server: Option<String>,

    /// Directory receiving running-configuration backups
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Seconds to wait after configuring NTP before checking the clock
    #[arg(long, value_name = "SECS")]
    pub settle_delay: Option<u64>,

    /// Deadline in seconds for every command sent to a device
    #[arg(long, value_name = "SECS")]
    pub command_timeout: Option<u64>,

    /// Telnet port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn usage() -> String {
        Self::command().render_help().to_string()
    }

    /// Applies the command-line overrides on top of `cfg`.
    pub fn apply_overrides(&self, cfg: &mut Config) -> Result<(), ConfigError> {
        if let Some(server) = &self.ntp_server {
            cfg.ntp.server = server.trim().to_string();
        }
        if let Some(dir) = &self.output_dir {
            cfg.output_dir = dir.clone();
        }
        if let Some(secs) = self.settle_delay {
            cfg.ntp.settle_delay = Duration::from_secs(secs);
        }
        if let Some(secs) = self.command_timeout {
            cfg.command_timeout = Duration::from_secs(secs);
        }
        if let Some(port) = self.port {
            cfg.transport.port = port;
        }
        cfg.validate()
    }
}
