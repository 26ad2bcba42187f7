//! # Fact Extractors
//!
//! Pure functions turning raw CLI output into facts. No I/O happens here; the
//! caller decides which command produced the text.

use std::sync::OnceLock;

use fleetcheck_common::device::{CdpState, ImageFacts};
use fleetcheck_common::error::ParseError;
use regex::Regex;

const CDP_DISABLED_MARKER: &str = "CDP is not enabled";
const CDP_ENTRY_MARKER: &str = "Device ID";
const MEMORY_MARKER: &str = "bytes of memory";
const IMAGE_MARKER: &str = "System image";

static IMAGE_FILENAME: OnceLock<Regex> = OnceLock::new();

fn image_filename_pattern() -> &'static Regex {
    IMAGE_FILENAME.get_or_init(|| Regex::new(r"[\w.-]+bin").expect("image filename pattern compiles"))
}

/// Returns the hostname from a `hostname <name>` declaration.
pub fn extract_hostname(text: &str) -> Result<String, ParseError> {
    text.split_whitespace()
        .nth(1)
        .map(str::to_string)
        .ok_or(ParseError::MissingHostname)
}

/// Reads CDP status and adjacency count from the `Device ID` filtered entry listing.
///
/// The count is the number of newline-delimited segments in the output, trailing
/// artifacts included. Output matching neither marker is reported as ON with no peers.
pub fn extract_cdp_state(text: &str) -> CdpState {
    if text.contains(CDP_DISABLED_MARKER) {
        return CdpState::off();
    }
    if text.contains(CDP_ENTRY_MARKER) {
        return CdpState::on(text.split('\n').count());
    }
    CdpState::on(0)
}

/// Reads the device model and software image from version output.
///
/// Expects a `... bytes of memory` line, whose second token is the model, and a
/// `System image ...` line, whose last token carries the image filename.
pub fn extract_image_facts(text: &str) -> Result<ImageFacts, ParseError> {
    let device_model = text
        .lines()
        .find(|line| line.contains(MEMORY_MARKER))
        .and_then(|line| line.split_whitespace().nth(1))
        .ok_or(ParseError::MissingModel)?;

    let token = text
        .lines()
        .find(|line| line.contains(IMAGE_MARKER))
        .and_then(|line| line.split_whitespace().last())
        .ok_or(ParseError::MissingImageLine)?;

    let image_filename = image_filename_pattern()
        .find(token)
        .ok_or_else(|| ParseError::ImageFilename {
            token: token.to_string(),
        })?
        .as_str();

    Ok(ImageFacts::new(device_model, image_filename))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
