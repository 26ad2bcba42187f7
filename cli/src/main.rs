mod commands;
mod terminal;

use std::process::ExitCode;

use anyhow::Context;
use commands::{CommandLine, audit};
use fleetcheck_common::config::Config;
use fleetcheck_common::device::parse_address_list;
use fleetcheck_common::info;
use terminal::{print, spinner};

/// Exit status for a missing or empty device list.
const EXIT_USAGE: u8 = 1;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let commands = CommandLine::parse_args();

    let addresses = match commands.devices.as_deref().map(parse_address_list) {
        Some(Ok(addresses)) => addresses,
        Some(Err(err)) => {
            println!("error: {err}\n");
            println!("{}", CommandLine::usage());
            return Ok(ExitCode::from(EXIT_USAGE));
        }
        None => {
            println!("{}", CommandLine::usage());
            return Ok(ExitCode::from(EXIT_USAGE));
        }
    };

    spinner::init_logging(spinner::Verbosity::from_flags(commands.verbose, commands.quiet));

    let (mut cfg, source) = Config::load(commands.config.as_deref()).context("failed to load configuration")?;
    commands
        .apply_overrides(&mut cfg)
        .context("invalid command-line override")?;

    print::banner();
    info!("Using configuration from {source}");

    print::header("fleet audit");
    audit::audit(addresses, &cfg, commands.username).await
}
