//! Device addresses as supplied on the command line.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// An IP address or hostname identifying one device for the duration of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceAddress(String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("device address is empty")]
    Empty,

    #[error("device address `{0}` contains whitespace")]
    Whitespace(String),

    #[error("no device addresses supplied")]
    NoAddresses,
}

impl DeviceAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for DeviceAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(AddressError::Empty);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(AddressError::Whitespace(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parses a comma-separated address list (e.g. `192.168.1.1,192.168.2.1`).
///
/// Empty entries are skipped; the order of the input is preserved.
pub fn parse_address_list(s: &str) -> Result<Vec<DeviceAddress>, AddressError> {
    let addresses = s
        .split(',')
        .filter(|part| !part.is_empty())
        .map(DeviceAddress::from_str)
        .collect::<Result<Vec<_>, _>>()?;

    if addresses.is_empty() {
        return Err(AddressError::NoAddresses);
    }
    Ok(addresses)
}
