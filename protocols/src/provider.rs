//! # Telnet Session Provider
//!
//! Opens a TCP connection to the device, logs in, elevates to privileged mode and
//! disables paging. The resulting [`TelnetSession`] runs commands by waiting for
//! the device prompt after each one.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use fleetcheck_common::config::{Config, TransportConfig};
use fleetcheck_common::device::{Credentials, DeviceAddress};
use fleetcheck_common::error::{ConnectionError, SessionError};
use fleetcheck_common::ports::{Session, SessionProvider};
use fleetcheck_common::{debug, info};
use regex::Regex;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::channel::CliChannel;

const AUTH_FAILURE_MARKERS: &[&str] = &[
    "% Login invalid",
    "% Authentication failed",
    "% Access denied",
    "% Bad passwords",
    "% Bad secrets",
];

const CONFIG_ERROR_MARKERS: &[&str] = &["% Invalid", "% Incomplete", "% Ambiguous"];

struct LoginPatterns {
    username: Regex,
    password: Regex,
    any_prompt: Regex,
}

static LOGIN_PATTERNS: OnceLock<LoginPatterns> = OnceLock::new();

fn login_patterns() -> &'static LoginPatterns {
    LOGIN_PATTERNS.get_or_init(|| LoginPatterns {
        username: Regex::new(r"(?i)(?:username|login)\s*:\s*\z").expect("username pattern compiles"),
        password: Regex::new(r"(?i)password\s*:\s*\z").expect("password pattern compiles"),
        any_prompt: Regex::new(r"(?m)^([\w.\-@/:]+)(?:\([\w.\-]+\))?[>#][ \t]*\z")
            .expect("prompt pattern compiles"),
    })
}

/// Matches `R1>`, `R1#` and config-mode prompts such as `R1(config)#` at the tail.
fn device_prompt(hostname: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?m)^{}(?:\([\w.\-]+\))?[>#][ \t]*\z",
        regex::escape(hostname)
    ))
}

pub struct TelnetProvider {
    transport: TransportConfig,
    command_timeout: Duration,
}

impl TelnetProvider {
    pub fn new(transport: TransportConfig, command_timeout: Duration) -> Self {
        Self {
            transport,
            command_timeout,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.transport.clone(), cfg.command_timeout)
    }

    async fn connect(&self, address: &str) -> Result<TcpStream, ConnectionError> {
        let target = format!("{}:{}", bracket_ipv6(address), self.transport.port);
        match timeout(self.transport.session_timeout, TcpStream::connect(&target)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(err)) => Err(ConnectionError::from_io(address, err)),
            Err(_elapsed) => Err(ConnectionError::Timeout {
                address: address.to_string(),
            }),
        }
    }
}

#[async_trait]
impl SessionProvider for TelnetProvider {
    async fn open(
        &self,
        address: &DeviceAddress,
        credentials: &Credentials,
    ) -> Result<Box<dyn Session>, ConnectionError> {
        let addr = address.as_str();
        let session_timeout = self.transport.session_timeout;

        let established = timeout(session_timeout, async {
            let stream = self.connect(addr).await?;
            debug!("TCP connection to {addr} established");
            TelnetSession::login(stream, addr, credentials, self.command_timeout).await
        })
        .await;

        match established {
            Ok(Ok(session)) => {
                info!("Logged in to {} at {addr}", session.hostname());
                Ok(Box::new(session))
            }
            Ok(Err(err)) => Err(err),
            Err(_elapsed) => Err(ConnectionError::Timeout {
                address: addr.to_string(),
            }),
        }
    }
}

/// A logged-in, privileged CLI session.
pub struct TelnetSession<S> {
    channel: CliChannel<S>,
    prompt: Regex,
    hostname: String,
}

impl<S> TelnetSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Drives the login dialogue on `stream` and prepares the CLI for scraping.
    pub async fn login(
        stream: S,
        address: &str,
        credentials: &Credentials,
        command_timeout: Duration,
    ) -> Result<Self, ConnectionError> {
        let patterns = login_patterns();
        let mut channel = CliChannel::new(stream, command_timeout);
        let fail = |err: SessionError| login_error(address, err);

        let (mut seen, mut text) = channel
            .read_until_any(&[&patterns.username, &patterns.password, &patterns.any_prompt], "login")
            .await
            .map_err(fail)?;

        if seen == 0 {
            channel.send_line(&credentials.username).await.map_err(fail)?;
            (seen, text) = channel
                .read_until_any(&[&patterns.username, &patterns.password, &patterns.any_prompt], "login")
                .await
                .map_err(fail)?;
        }

        if seen == 1 {
            channel.send_line(&credentials.password).await.map_err(fail)?;
            (seen, text) = channel
                .read_until_any(&[&patterns.username, &patterns.password, &patterns.any_prompt], "login")
                .await
                .map_err(fail)?;
        }

        if seen != 2 || is_auth_failure(&text) {
            return Err(ConnectionError::Authentication {
                address: address.to_string(),
            });
        }

        if text.trim_end().ends_with('>') {
            channel.send_line("enable").await.map_err(fail)?;
            let (mut step, mut elevated) = channel
                .read_until_any(&[&patterns.password, &patterns.any_prompt], "enable")
                .await
                .map_err(fail)?;
            if step == 0 {
                channel.send_line(&credentials.secret).await.map_err(fail)?;
                (step, elevated) = channel
                    .read_until_any(&[&patterns.password, &patterns.any_prompt], "enable")
                    .await
                    .map_err(fail)?;
            }
            if step == 0 || is_auth_failure(&elevated) || !elevated.trim_end().ends_with('#') {
                return Err(ConnectionError::Authentication {
                    address: address.to_string(),
                });
            }
            text = elevated;
        }

        let hostname = prompt_hostname(&text).ok_or_else(|| ConnectionError::InvalidParameter {
            address: address.to_string(),
            detail: "could not recognise the device prompt".to_string(),
        })?;
        let prompt = device_prompt(&hostname).map_err(|e| ConnectionError::InvalidParameter {
            address: address.to_string(),
            detail: e.to_string(),
        })?;

        let mut session = Self {
            channel,
            prompt,
            hostname,
        };
        session.execute_raw("terminal length 0").await.map_err(fail)?;
        Ok(session)
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    async fn execute_raw(&mut self, command: &str) -> Result<String, SessionError> {
        self.channel.send_line(command).await?;
        let raw = self.channel.read_until(&self.prompt, command).await?;
        Ok(strip_echo_and_prompt(&raw, command))
    }
}

#[async_trait]
impl<S> Session for TelnetSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn execute(&mut self, command: &str) -> Result<String, SessionError> {
        self.execute_raw(command).await
    }

    async fn configure(&mut self, lines: &[String]) -> Result<(), SessionError> {
        self.execute_raw("configure terminal").await?;

        for line in lines {
            let response = self.execute_raw(line).await?;
            if CONFIG_ERROR_MARKERS.iter().any(|m| response.contains(m)) {
                self.execute_raw("end").await?;
                return Err(SessionError::Rejected {
                    line: line.clone(),
                    response: response.trim().to_string(),
                });
            }
        }

        self.execute_raw("end").await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        self.channel.send_line("exit").await?;
        self.channel.shutdown().await
    }
}

fn login_error(address: &str, err: SessionError) -> ConnectionError {
    let address = address.to_string();
    match err {
        SessionError::Timeout { .. } => ConnectionError::Timeout { address },
        SessionError::Closed => ConnectionError::Reset { address },
        SessionError::Io(source) => ConnectionError::from_io(&address, source),
        SessionError::Rejected { response, .. } => ConnectionError::InvalidParameter {
            address,
            detail: response,
        },
    }
}

fn is_auth_failure(text: &str) -> bool {
    AUTH_FAILURE_MARKERS.iter().any(|m| text.contains(m))
}

fn prompt_hostname(text: &str) -> Option<String> {
    login_patterns()
        .any_prompt
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Drops the echoed command line and the trailing prompt line.
fn strip_echo_and_prompt(raw: &str, command: &str) -> String {
    let mut lines: Vec<&str> = raw.split('\n').collect();
    lines.pop();
    if lines.first().is_some_and(|first| first.trim_end().ends_with(command.trim())) {
        lines.remove(0);
    }
    lines.join("\n")
}

fn bracket_ipv6(address: &str) -> String {
    if address.contains(':') && !address.starts_with('[') {
        format!("[{address}]")
    } else {
        address.to_string()
    }
}
