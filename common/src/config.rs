//! # Run Configuration
//!
//! Every tunable of a batch run lives in [`Config`], which is built once and handed
//! to the components that need it. Values are layered:
//! 1. Built-in defaults.
//! 2. A TOML file (`--config <path>`, or `~/.config/fleetcheck/config.toml` when present).
//! 3. Command-line overrides, applied by the binary.
//!
//! ```toml
//! output_dir = "_output"
//! command_timeout_secs = 60
//!
//! [ntp]
//! server = "10.177.0.1"
//! timezone_command = "clock timezone GMT 0"
//! settle_delay_secs = 5
//!
//! [transport]
//! protocol = "telnet"
//! port = 23
//! session_timeout_secs = 10
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_OUTPUT_DIR: &str = "_output";
pub const DEFAULT_NTP_SERVER: &str = "10.177.0.1";
pub const DEFAULT_TIMEZONE_COMMAND: &str = "clock timezone GMT 0";
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_TELNET_PORT: u16 = 23;

/// Transport used to reach the device CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    #[default]
    Telnet,
}

impl FromStr for Protocol {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "telnet" | "cisco_ios_telnet" => Ok(Protocol::Telnet),
            _ => Err(ConfigError::UnknownProtocol(s.to_string())),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Telnet => f.write_str("telnet"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NtpConfig {
    /// Address probed and, when reachable, configured as the NTP server.
    pub server: String,
    pub timezone_command: String,
    /// Blocking wait between pushing the NTP config and checking the clock.
    pub settle_delay: Duration,
}

impl NtpConfig {
    /// The configuration lines pushed to a device that can reach the server.
    pub fn commands(&self) -> Vec<String> {
        vec![
            self.timezone_command.clone(),
            format!("ntp server {}", self.server),
        ]
    }
}

impl Default for NtpConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_NTP_SERVER.to_string(),
            timezone_command: DEFAULT_TIMEZONE_COMMAND.to_string(),
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub protocol: Protocol,
    pub port: u16,
    /// Upper bound for connecting and logging in.
    pub session_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            protocol: Protocol::default(),
            port: DEFAULT_TELNET_PORT,
            session_timeout: DEFAULT_SESSION_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory receiving the running-configuration backups.
    pub output_dir: PathBuf,
    pub ntp: NtpConfig,
    pub transport: TransportConfig,
    /// Deadline for a single command round-trip.
    pub command_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            ntp: NtpConfig::default(),
            transport: TransportConfig::default(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }
}

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Default,
    ConfigFile(PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "built-in defaults"),
            ConfigSource::ConfigFile(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    output_dir: Option<PathBuf>,
    command_timeout_secs: Option<u64>,
    ntp: Option<NtpSection>,
    transport: Option<TransportSection>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct NtpSection {
    server: Option<String>,
    timezone_command: Option<String>,
    settle_delay_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TransportSection {
    protocol: Option<String>,
    port: Option<u16>,
    session_timeout_secs: Option<u64>,
}

impl Config {
    /// `~/.config/fleetcheck/config.toml` (platform equivalent elsewhere).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .map(|p| p.join("fleetcheck").join("config.toml"))
    }

    /// Loads the configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is used
    /// when a file is there, and the built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<(Self, ConfigSource), ConfigError> {
        let path: PathBuf = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) if p.exists() => p,
                _ => return Ok((Self::default(), ConfigSource::Default)),
            },
        };

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml(&content, &path)?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok((config, ConfigSource::ConfigFile(path)))
    }

    /// Parses TOML on top of the defaults. `path` is only used in error messages.
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::default();
        config.apply(file)?;
        config.validate()?;
        Ok(config)
    }

    fn apply(&mut self, file: ConfigFile) -> Result<(), ConfigError> {
        if let Some(dir) = file.output_dir {
            self.output_dir = dir;
        }
        if let Some(secs) = file.command_timeout_secs {
            self.command_timeout = Duration::from_secs(secs);
        }
        if let Some(ntp) = file.ntp {
            if let Some(server) = ntp.server {
                self.ntp.server = server.trim().to_string();
            }
            if let Some(cmd) = ntp.timezone_command {
                self.ntp.timezone_command = cmd.trim().to_string();
            }
            if let Some(secs) = ntp.settle_delay_secs {
                self.ntp.settle_delay = Duration::from_secs(secs);
            }
        }
        if let Some(transport) = file.transport {
            if let Some(protocol) = transport.protocol {
                self.transport.protocol = protocol.parse()?;
            }
            if let Some(port) = transport.port {
                self.transport.port = port;
            }
            if let Some(secs) = transport.session_timeout_secs {
                self.transport.session_timeout = Duration::from_secs(secs);
            }
        }
        Ok(())
    }

    /// Rejects values that would make every device fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ntp.server.is_empty() || self.ntp.server.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid {
                field: "ntp.server",
                reason: format!("`{}` is not a host address", self.ntp.server),
            });
        }
        if self.ntp.timezone_command.is_empty() {
            return Err(ConfigError::Invalid {
                field: "ntp.timezone_command",
                reason: "must not be empty".to_string(),
            });
        }
        if self.command_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                field: "command_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.transport.session_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                field: "transport.session_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.transport.port == 0 {
            return Err(ConfigError::Invalid {
                field: "transport.port",
                reason: "must not be 0".to_string(),
            });
        }
        Ok(())
    }
}
