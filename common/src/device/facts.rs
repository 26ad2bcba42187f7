//! Facts read from a device and the result record assembled from them.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CdpStatus {
    On,
    Off,
}

impl fmt::Display for CdpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CdpStatus::On => f.write_str("ON"),
            CdpStatus::Off => f.write_str("OFF"),
        }
    }
}

/// CDP status and adjacency count. The count is always zero while CDP is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CdpState {
    status: CdpStatus,
    peer_count: usize,
}

impl CdpState {
    pub fn off() -> Self {
        Self {
            status: CdpStatus::Off,
            peer_count: 0,
        }
    }

    pub fn on(peer_count: usize) -> Self {
        Self {
            status: CdpStatus::On,
            peer_count,
        }
    }

    pub fn status(&self) -> CdpStatus {
        self.status
    }

    pub fn peer_count(&self) -> usize {
        self.peer_count
    }
}

/// Licensing class of a software image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    /// Standard image with payload encryption.
    Pe,
    /// No Payload Encryption.
    Npe,
}

impl ImageType {
    /// An image is NPE iff its lowercased filename contains `npe`.
    pub fn classify(image_filename: &str) -> Self {
        if image_filename.to_lowercase().contains("npe") {
            ImageType::Npe
        } else {
            ImageType::Pe
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageType::Pe => f.write_str("PE"),
            ImageType::Npe => f.write_str("NPE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFacts {
    pub image_type: ImageType,
    pub device_model: String,
    pub image_filename: String,
}

impl ImageFacts {
    pub fn new(device_model: impl Into<String>, image_filename: impl Into<String>) -> Self {
        let image_filename = image_filename.into();
        Self {
            image_type: ImageType::classify(&image_filename),
            device_model: device_model.into(),
            image_filename,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSyncState {
    Synced,
    NotSynced,
}

impl fmt::Display for ClockSyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockSyncState::Synced => f.write_str("SYNCED"),
            ClockSyncState::NotSynced => f.write_str("NOT SYNCED"),
        }
    }
}

/// Everything learned about one device during a successful audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceResult {
    pub hostname: String,
    pub image: ImageFacts,
    pub cdp: CdpState,
    pub clock: ClockSyncState,
}

impl fmt::Display for DeviceResult {
    /// `R1 | 4096K/4096K | c2900-universalk9-mz.npe.bin | NPE | CDP is ON, 2 peers | Clock in SYNCED`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | {} | CDP is {}, {} peers | Clock in {}",
            self.hostname,
            self.image.device_model,
            self.image.image_filename,
            self.image.image_type,
            self.cdp.status(),
            self.cdp.peer_count(),
            self.clock
        )
    }
}
