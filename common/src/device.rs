//! # Device Models
//!
//! Everything the audit knows about a device: where it lives, how to log in,
//! the facts read from it and the line printed for it.

pub mod address;
pub mod credentials;
pub mod facts;
pub mod outcome;

pub use address::{AddressError, DeviceAddress, parse_address_list};
pub use credentials::Credentials;
pub use facts::{CdpState, CdpStatus, ClockSyncState, DeviceResult, ImageFacts, ImageType};
pub use outcome::{BatchOutcome, DeviceFailure, DeviceOutcome};
